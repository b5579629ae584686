//! Schema-driven, zero-copy reader for FlatBuffers-layout binary buffers.
//!
//! Types are registered at runtime as ordered lists of field decoders. Tables
//! are found through their vtables, structs are read inline, and scalar vectors
//! and strings are returned as views into the source buffer.

pub mod containers;
pub mod decoding;
pub mod error;
pub mod options;
pub mod reflection;
pub mod tables;
pub mod vtable;
pub mod wire;

#[cfg(feature = "serde_support")]
pub mod serde;

#[doc(hidden)]
pub mod tests;

use std::sync::Arc;

pub use containers::{ScalarView, TypedView};
pub use decoding::{Decoder, TableLayout};
pub use error::{Error, Result};
pub use options::{DecoderOptions, Endian, TextEncoding};
pub use reflection::{Object, Value};
pub use tables::{Element, Field, FieldDecoder, Schema, TypeDef};
pub use vtable::{CacheStats, Vtable};
pub use wire::{Scalar, ScalarKind};

/// Decodes the root table of `buf`, checking the file identifier when given.
pub fn decode_root<'a>(
    buf: &'a [u8],
    schema: Arc<Schema>,
    options: DecoderOptions,
    type_name: &str,
    identifier: Option<&[u8; wire::FILE_IDENTIFIER_LENGTH]>,
) -> Result<Object<'a>> {
    let mut decoder = Decoder::with_schema(buf, schema, options);
    if let Some(identifier) = identifier {
        decoder.check_identifier(identifier)?;
    }
    decoder.root(type_name)
}

/// Reads a whole buffer so it can be decoded in place.
pub fn read_buffer(reader: &mut impl std::io::Read) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    log::debug!("read {} byte buffer", buf.len());
    Ok(buf)
}

pub fn read_buffer_async<'a>(
    reader: &'a mut (impl futures::io::AsyncRead + Unpin),
) -> impl core::future::Future<Output = anyhow::Result<Vec<u8>>> + 'a {
    use futures::io::AsyncReadExt;

    async move {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        log::debug!("read {} byte buffer", buf.len());
        Ok(buf)
    }
}
