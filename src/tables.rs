use std::collections::HashMap;
use std::sync::Arc;

use crate::decoding::Decoder;
use crate::error::Result;
use crate::reflection::Value;
use crate::wire::ScalarKind;

/// A user decode function. It reads at the decoder's cursor and may recurse into it.
pub type DecodeFn = Arc<dyn for<'a> Fn(&mut Decoder<'a>) -> Result<Value<'a>> + Send + Sync>;

pub fn decode_fn<F>(f: F) -> DecodeFn
where
    F: for<'a> Fn(&mut Decoder<'a>) -> Result<Value<'a>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Element type of a length-prefixed vector.
#[derive(Clone)]
pub enum Element {
    /// Fixed-width scalars decoded as a zero-copy view, `dim` scalars per element.
    Scalar { kind: ScalarKind, dim: usize },
    /// A registered table (stored as offsets) or struct (stored inline).
    Object(Arc<str>),
    Custom(DecodeFn),
}

impl Element {
    pub fn scalar(kind: ScalarKind) -> Self {
        Element::Scalar { kind, dim: 1 }
    }

    pub fn scalar_group(kind: ScalarKind, dim: usize) -> Self {
        Element::Scalar { kind, dim }
    }

    pub fn object(type_name: impl Into<Arc<str>>) -> Self {
        Element::Object(type_name.into())
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: for<'a> Fn(&mut Decoder<'a>) -> Result<Value<'a>> + Send + Sync + 'static,
    {
        Element::Custom(decode_fn(f))
    }
}

impl core::fmt::Debug for Element {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Element::Scalar { kind, dim } => write!(f, "[{}; {}]", kind.name(), dim),
            Element::Object(name) => f.write_str(name),
            Element::Custom(_) => f.write_str("<custom>"),
        }
    }
}

#[derive(Clone)]
pub enum FieldDecoder {
    Scalar(ScalarKind),
    /// Nested table through an offset, or an inline struct.
    Object(Arc<str>),
    Vector(Element),
    String,
    /// Advances the cursor without producing a value: struct padding, or a
    /// deprecated table slot when the width is zero.
    Skip(usize),
    Custom(DecodeFn),
}

impl core::fmt::Debug for FieldDecoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FieldDecoder::Scalar(kind) => f.write_str(kind.name()),
            FieldDecoder::Object(name) => f.write_str(name),
            FieldDecoder::Vector(element) => write!(f, "[{:?}]", element),
            FieldDecoder::String => f.write_str("string"),
            FieldDecoder::Skip(width) => write!(f, "skip({})", width),
            FieldDecoder::Custom(_) => f.write_str("<custom>"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: Arc<str>,
    pub decoder: FieldDecoder,
}

impl Field {
    pub fn new(name: impl Into<Arc<str>>, decoder: FieldDecoder) -> Self {
        Field {
            name: name.into(),
            decoder,
        }
    }

    pub fn scalar(name: impl Into<Arc<str>>, kind: ScalarKind) -> Self {
        Field::new(name, FieldDecoder::Scalar(kind))
    }

    pub fn object(name: impl Into<Arc<str>>, type_name: impl Into<Arc<str>>) -> Self {
        Field::new(name, FieldDecoder::Object(type_name.into()))
    }

    pub fn vector(name: impl Into<Arc<str>>, element: Element) -> Self {
        Field::new(name, FieldDecoder::Vector(element))
    }

    pub fn string(name: impl Into<Arc<str>>) -> Self {
        Field::new(name, FieldDecoder::String)
    }

    pub fn padding(width: usize) -> Self {
        Field::new("", FieldDecoder::Skip(width))
    }

    pub fn deprecated(name: impl Into<Arc<str>>) -> Self {
        Field::new(name, FieldDecoder::Skip(0))
    }

    pub fn custom<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: for<'a> Fn(&mut Decoder<'a>) -> Result<Value<'a>> + Send + Sync + 'static,
    {
        Field::new(name, FieldDecoder::Custom(decode_fn(f)))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.decoder, FieldDecoder::Skip(_))
    }
}

/// Ordered field descriptors; the index of a field is its vtable slot.
#[derive(Clone, Debug)]
pub enum TypeDef {
    Table(Vec<Field>),
    Struct(Vec<Field>),
}

impl TypeDef {
    pub fn fields(&self) -> &[Field] {
        match self {
            TypeDef::Table(fields) | TypeDef::Struct(fields) => fields,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, TypeDef::Table(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, TypeDef::Struct(_))
    }
}

/// Registered tables and structs, keyed by type name.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    types: HashMap<Arc<str>, Arc<TypeDef>>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Registers or replaces a table type.
    pub fn register_table(
        &mut self,
        name: impl Into<Arc<str>>,
        fields: impl IntoIterator<Item = Field>,
    ) -> &mut Self {
        let name = name.into();
        log::trace!("register table {}", name);
        self.types
            .insert(name, Arc::new(TypeDef::Table(fields.into_iter().collect())));
        self
    }

    /// Registers or replaces a struct type.
    pub fn register_struct(
        &mut self,
        name: impl Into<Arc<str>>,
        fields: impl IntoIterator<Item = Field>,
    ) -> &mut Self {
        let name = name.into();
        log::trace!("register struct {}", name);
        self.types
            .insert(name, Arc::new(TypeDef::Struct(fields.into_iter().collect())));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeDef>> {
        self.types.get(name)
    }

    /// Owned handles to the registered name and definition.
    pub fn entry(&self, name: &str) -> Option<(Arc<str>, Arc<TypeDef>)> {
        self.types
            .get_key_value(name)
            .map(|(name, def)| (name.clone(), def.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|name| &**name)
    }
}
