use std::borrow::Cow;
use std::sync::Arc;

use crate::containers::ScalarView;
use crate::options::Endian;
use crate::wire::{Scalar, ScalarKind};

/// One decoded table or struct: its present fields in slot order.
#[derive(Clone, PartialEq)]
pub struct Object<'a> {
    type_name: Arc<str>,
    fields: Vec<(Arc<str>, Value<'a>)>,
}

impl<'a> Object<'a> {
    pub(crate) fn new(type_name: Arc<str>, capacity: usize) -> Self {
        Object {
            type_name,
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, name: Arc<str>, value: Value<'a>) {
        self.fields.push((name, value));
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, field_name: &str) -> Option<&Value<'a>> {
        self.fields
            .iter()
            .find(|(name, _)| &**name == field_name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, field_name: &str) -> bool {
        self.get(field_name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| &**name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<'a>)> {
        self.fields.iter().map(|(name, value)| (&**name, value))
    }
}

impl core::fmt::Debug for Object<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut debug_struct = f.debug_struct(&self.type_name);
        for (name, value) in &self.fields {
            debug_struct.field(name, value);
        }
        debug_struct.finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    String(Cow<'a, str>),
    Object(Object<'a>),
    List(Vec<Value<'a>>),
    View(ScalarView<'a>),
}

impl<'a> Value<'a> {
    pub(crate) fn from_scalar_bytes(kind: ScalarKind, bytes: &[u8], endian: Endian) -> Self {
        match kind {
            ScalarKind::Bool => Value::Bool(bool::decode(bytes, endian)),
            ScalarKind::U8 => Value::U8(u8::decode(bytes, endian)),
            ScalarKind::I8 => Value::I8(i8::decode(bytes, endian)),
            ScalarKind::U16 => Value::U16(u16::decode(bytes, endian)),
            ScalarKind::I16 => Value::I16(i16::decode(bytes, endian)),
            ScalarKind::U32 => Value::U32(u32::decode(bytes, endian)),
            ScalarKind::I32 => Value::I32(i32::decode(bytes, endian)),
            ScalarKind::U64 => Value::U64(u64::decode(bytes, endian)),
            ScalarKind::I64 => Value::I64(i64::decode(bytes, endian)),
            ScalarKind::F32 => Value::F32(f32::decode(bytes, endian)),
            ScalarKind::F64 => Value::F64(f64::decode(bytes, endian)),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Any integer that fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::U8(v) => Some(v as i64),
            Value::I8(v) => Some(v as i64),
            Value::U16(v) => Some(v as i64),
            Value::I16(v) => Some(v as i64),
            Value::U32(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::U64(v) => i64::try_from(v).ok(),
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Any non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U8(v) => Some(v as u64),
            Value::U16(v) => Some(v as u64),
            Value::U32(v) => Some(v as u64),
            Value::U64(v) => Some(v),
            _ => self.as_i64().and_then(|v| u64::try_from(v).ok()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v as f64),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object<'a>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&ScalarView<'a>> {
        match self {
            Value::View(view) => Some(view),
            _ => None,
        }
    }
}

impl<'a> From<Object<'a>> for Value<'a> {
    fn from(obj: Object<'a>) -> Self {
        Value::Object(obj)
    }
}
