use std::borrow::Cow;
use std::sync::Arc;

use crate::containers::ScalarView;
use crate::error::{Error, Result};
use crate::options::{DecoderOptions, Endian, TextEncoding};
use crate::reflection::{Object, Value};
use crate::tables::{Element, Field, FieldDecoder, Schema, TypeDef};
use crate::vtable::{CacheStats, Vtable, VtableCache};
use crate::wire::{FILE_IDENTIFIER_LENGTH, ReadCursor, Scalar, ScalarKind, UOFFSET_SIZE, displace};

/// Physical layout of one table instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub instance_start: usize,
    pub vtable_offset: usize,
    pub vtable: Vtable,
}

/// Stateful reader over one buffer.
///
/// Every decode call starts at the current cursor. Table, vector and string
/// reads consume only their 4 byte offset slot, so sibling fields can be read
/// one after another; struct reads consume the struct's inline bytes.
pub struct Decoder<'a> {
    cursor: ReadCursor<'a>,
    schema: Arc<Schema>,
    vtables: VtableCache,
    options: DecoderOptions,
    depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, DecoderOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: DecoderOptions) -> Self {
        Self::with_schema(buf, Arc::new(Schema::new()), options)
    }

    pub fn with_schema(buf: &'a [u8], schema: Arc<Schema>, options: DecoderOptions) -> Self {
        log::debug!(
            "decoder over {} bytes, {:?} endian, {} registered types",
            buf.len(),
            options.endian,
            schema.len()
        );
        Decoder {
            cursor: ReadCursor::new(buf, options.endian),
            schema,
            vtables: VtableCache::new(options.vtable_cache_limit),
            options,
            depth: 0,
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn endian(&self) -> Endian {
        self.options.endian
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.cursor.buffer()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn seek(&mut self, pos: usize) {
        self.cursor.seek(pos);
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Registers a table on this decoder. A schema shared with other decoders is
    /// copied first, the other decoders keep seeing the old definitions.
    pub fn register_table(
        &mut self,
        name: impl Into<Arc<str>>,
        fields: impl IntoIterator<Item = Field>,
    ) -> &mut Self {
        Arc::make_mut(&mut self.schema).register_table(name, fields);
        self
    }

    pub fn register_struct(
        &mut self,
        name: impl Into<Arc<str>>,
        fields: impl IntoIterator<Item = Field>,
    ) -> &mut Self {
        Arc::make_mut(&mut self.schema).register_struct(name, fields);
        self
    }

    pub fn read<T: Scalar>(&mut self) -> Result<T> {
        self.cursor.read()
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.cursor.u8()
    }

    pub fn i8(&mut self) -> Result<i8> {
        self.cursor.i8()
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.cursor.u16()
    }

    pub fn i16(&mut self) -> Result<i16> {
        self.cursor.i16()
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.cursor.u32()
    }

    pub fn i32(&mut self) -> Result<i32> {
        self.cursor.i32()
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.cursor.u64()
    }

    pub fn i64(&mut self) -> Result<i64> {
        self.cursor.i64()
    }

    pub fn f32(&mut self) -> Result<f32> {
        self.cursor.f32()
    }

    pub fn f64(&mut self) -> Result<f64> {
        self.cursor.f64()
    }

    pub fn bool(&mut self) -> Result<bool> {
        self.cursor.bool()
    }

    pub fn scalar(&mut self, kind: ScalarKind) -> Result<Value<'a>> {
        let bytes = self.cursor.slice(kind.width())?;
        Ok(Value::from_scalar_bytes(kind, bytes, self.endian()))
    }

    /// Resolves the vtable at an absolute offset, memoized per decoder.
    pub fn vtable(&mut self, offset: usize) -> Result<Vtable> {
        self.vtables.resolve(&self.cursor, offset)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.vtables.stats()
    }

    pub fn clear_vtable_cache(&mut self) {
        self.vtables.clear();
    }

    /// Reads the offset slot at the cursor, runs `f` with the absolute target and
    /// leaves the cursor just past the slot whatever `f` did.
    fn indirect<T>(&mut self, f: impl FnOnce(&mut Self, usize) -> Result<T>) -> Result<T> {
        let origin = self.cursor.position();
        let offset = self.cursor.u32()?;
        let target = displace(origin, offset as i64, self.cursor.len())?;
        let result = f(self, target);
        self.cursor.seek(origin + UOFFSET_SIZE);
        result
    }

    fn table_layout(&mut self, instance_start: usize) -> Result<TableLayout> {
        let soffset = self.cursor.peek_at::<i32>(instance_start)?;
        let vtable_offset = displace(instance_start, -(soffset as i64), self.cursor.len())?;
        let vtable = self.vtables.resolve(&self.cursor, vtable_offset)?;
        Ok(TableLayout {
            instance_start,
            vtable_offset,
            vtable,
        })
    }

    /// Layout of the table whose offset slot is at the cursor, no schema needed.
    pub fn inspect_table(&mut self) -> Result<TableLayout> {
        self.indirect(|this, instance_start| this.table_layout(instance_start))
    }

    /// Decodes a registered table (cursor on its offset slot) or struct (cursor
    /// on its first byte).
    pub fn object(&mut self, type_name: &str) -> Result<Object<'a>> {
        let Some((name, def)) = self.schema.entry(type_name) else {
            return Err(Error::UnknownType(type_name.to_owned()));
        };
        if self.depth >= self.options.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        log::trace!("decode {} at {}", name, self.cursor.position());
        self.depth += 1;
        let result = match &*def {
            TypeDef::Table(fields) => self.decode_table(name, fields),
            TypeDef::Struct(fields) => self.decode_struct(name, fields),
        };
        self.depth -= 1;
        result
    }

    fn decode_table(&mut self, name: Arc<str>, fields: &[Field]) -> Result<Object<'a>> {
        self.indirect(|this, instance_start| {
            let layout = this.table_layout(instance_start)?;
            let mut obj = Object::new(name, fields.len().min(layout.vtable.field_count()));
            for (slot, field) in fields.iter().enumerate() {
                if field.is_skipped() {
                    continue;
                }
                // Slots the writer omitted, or never knew about, are absent.
                let Some(offset) = layout.vtable.field_offset(slot) else {
                    continue;
                };
                this.cursor.seek(instance_start + offset as usize);
                if let Some(value) = this.decode_field(&field.decoder)? {
                    obj.insert(field.name.clone(), value);
                }
            }
            Ok(obj)
        })
    }

    fn decode_struct(&mut self, name: Arc<str>, fields: &[Field]) -> Result<Object<'a>> {
        let mut obj = Object::new(name, fields.len());
        for field in fields {
            if let Some(value) = self.decode_field(&field.decoder)? {
                obj.insert(field.name.clone(), value);
            }
        }
        Ok(obj)
    }

    /// Runs one field decoder at the cursor. `Skip` only advances it.
    fn decode_field(&mut self, decoder: &FieldDecoder) -> Result<Option<Value<'a>>> {
        let value = match decoder {
            FieldDecoder::Scalar(kind) => self.scalar(*kind)?,
            FieldDecoder::Object(type_name) => Value::Object(self.object(type_name)?),
            FieldDecoder::Vector(element) => self.vector(element)?,
            FieldDecoder::String => Value::String(self.string()?),
            FieldDecoder::Custom(f) => f(self)?,
            FieldDecoder::Skip(width) => {
                self.cursor.slice(*width)?;
                return Ok(None);
            }
        };
        Ok(Some(value))
    }

    pub fn vector(&mut self, element: &Element) -> Result<Value<'a>> {
        match element {
            Element::Scalar { kind, dim } => self.scalar_vector(*kind, *dim).map(Value::View),
            Element::Object(type_name) => self.object_vector(type_name).map(Value::List),
            Element::Custom(f) => self.vector_with(|this| f(this)).map(Value::List),
        }
    }

    /// Zero-copy view over a vector of scalars, `dim` scalars per element.
    /// A `dim` of zero is treated as one.
    pub fn scalar_vector(&mut self, kind: ScalarKind, dim: usize) -> Result<ScalarView<'a>> {
        let dim = dim.max(1);
        let endian = self.endian();
        self.indirect(|this, start| {
            this.cursor.seek(start);
            let count = this.cursor.u32()? as usize;
            let body = this.cursor.position();
            let len = count
                .checked_mul(dim)
                .and_then(|n| n.checked_mul(kind.width()))
                .ok_or(Error::OutOfBounds {
                    offset: body as i64,
                    width: usize::MAX,
                    len: this.cursor.len(),
                })?;
            let bytes = this.cursor.slice(len)?;
            Ok(ScalarView::new(bytes, kind, dim, endian))
        })
    }

    /// Vector of tables (offset slots) or structs (inline).
    pub fn object_vector(&mut self, type_name: &str) -> Result<Vec<Value<'a>>> {
        self.vector_with(|this| this.object(type_name).map(Value::Object))
    }

    /// Calls `f` once per element with the cursor on that element.
    ///
    /// Elements that read no bytes are only accepted while `count` fits in the
    /// bytes left after the count, so a forged count cannot spin forever.
    pub fn vector_with<T>(&mut self, mut f: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.indirect(|this, start| {
            this.cursor.seek(start);
            let count = this.cursor.u32()? as usize;
            let body = this.cursor.position();
            let remaining = this.cursor.remaining();
            let mut items = Vec::with_capacity(count.min(remaining));
            for _ in 0..count {
                let before = this.cursor.position();
                items.push(f(this)?);
                if this.cursor.position() == before && count > remaining {
                    return Err(Error::OutOfBounds {
                        offset: body as i64,
                        width: count,
                        len: this.cursor.len(),
                    });
                }
            }
            Ok(items)
        })
    }

    /// Bytes of a length-prefixed `[ubyte]`, borrowed from the buffer.
    pub fn bytes(&mut self) -> Result<&'a [u8]> {
        self.indirect(|this, start| {
            this.cursor.seek(start);
            let len = this.cursor.u32()? as usize;
            this.cursor.slice(len)
        })
    }

    pub fn string(&mut self) -> Result<Cow<'a, str>> {
        let encoding = self.options.text;
        self.indirect(|this, start| {
            this.cursor.seek(start);
            let len = this.cursor.u32()? as usize;
            let offset = this.cursor.position();
            let bytes = this.cursor.slice(len)?;
            decode_text(bytes, encoding, offset)
        })
    }

    fn root_slot(&self) -> usize {
        if self.options.size_prefixed {
            UOFFSET_SIZE
        } else {
            0
        }
    }

    /// The leading byte length of a size-prefixed buffer.
    pub fn size_prefix(&self) -> Result<Option<u32>> {
        if !self.options.size_prefixed {
            return Ok(None);
        }
        self.cursor.peek_at::<u32>(0).map(Some)
    }

    /// The 4 bytes following the root offset, if the buffer is long enough.
    pub fn file_identifier(&self) -> Option<[u8; FILE_IDENTIFIER_LENGTH]> {
        let bytes = self
            .cursor
            .slice_at(self.root_slot() + UOFFSET_SIZE, FILE_IDENTIFIER_LENGTH)
            .ok()?;
        let mut identifier = [0u8; FILE_IDENTIFIER_LENGTH];
        identifier.copy_from_slice(bytes);
        Some(identifier)
    }

    pub fn check_identifier(&self, expected: &[u8; FILE_IDENTIFIER_LENGTH]) -> Result<()> {
        let found = self.file_identifier().ok_or(Error::OutOfBounds {
            offset: (self.root_slot() + UOFFSET_SIZE) as i64,
            width: FILE_IDENTIFIER_LENGTH,
            len: self.cursor.len(),
        })?;
        if &found != expected {
            return Err(Error::IdentifierMismatch {
                expected: *expected,
                found,
            });
        }
        Ok(())
    }

    /// Decodes the root table whose offset sits at the start of the buffer.
    pub fn root(&mut self, type_name: &str) -> Result<Object<'a>> {
        if let Some(size) = self.size_prefix()? {
            let declared = UOFFSET_SIZE + size as usize;
            if declared > self.cursor.len() {
                return Err(Error::OutOfBounds {
                    offset: 0,
                    width: declared,
                    len: self.cursor.len(),
                });
            }
        }
        self.cursor.seek(self.root_slot());
        self.object(type_name)
    }
}

fn decode_text(bytes: &[u8], encoding: TextEncoding, offset: usize) -> Result<Cow<'_, str>> {
    match encoding {
        TextEncoding::Utf8 => core::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| Error::InvalidUtf8 { offset }),
        TextEncoding::Utf8Lossy => Ok(String::from_utf8_lossy(bytes)),
        TextEncoding::Latin1 => match core::str::from_utf8(bytes) {
            Ok(text) if bytes.is_ascii() => Ok(Cow::Borrowed(text)),
            _ => Ok(Cow::Owned(bytes.iter().map(|&b| b as char).collect())),
        },
    }
}
