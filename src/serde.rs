use serde::ser::{SerializeMap, SerializeSeq};

use crate::containers::ScalarView;
use crate::reflection::{Object, Value};

/// Field names are only known at runtime, so objects serialize as maps in slot order.
impl serde::Serialize for Object<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map_serializer = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map_serializer.serialize_entry(name, value)?;
        }
        map_serializer.end()
    }
}

impl serde::Serialize for ScalarView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.dim() > 1 {
            let mut seq_serializer = serializer.serialize_seq(Some(self.groups()))?;
            for index in 0..self.groups() {
                if let Some(group) = self.group(index) {
                    seq_serializer.serialize_element(&group.iter().collect::<Vec<_>>())?;
                }
            }
            return seq_serializer.end();
        }
        let mut seq_serializer = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            seq_serializer.serialize_element(&value)?;
        }
        seq_serializer.end()
    }
}

impl serde::Serialize for Value<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v.as_ref()),
            Value::Object(obj) => obj.serialize(serializer),
            Value::List(list) => list.serialize(serializer),
            Value::View(view) => view.serialize(serializer),
        }
    }
}
