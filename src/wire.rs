use crate::error::{Error, Result};
use crate::options::Endian;

pub const UOFFSET_SIZE: usize = 4;
pub const SOFFSET_SIZE: usize = 4;
pub const VOFFSET_SIZE: usize = 2;
pub const FILE_IDENTIFIER_LENGTH: usize = 4;

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ScalarKind {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ScalarKind {
    pub const fn width(self) -> usize {
        match self {
            ScalarKind::Bool | ScalarKind::U8 | ScalarKind::I8 => 1,
            ScalarKind::U16 | ScalarKind::I16 => 2,
            ScalarKind::U32 | ScalarKind::I32 | ScalarKind::F32 => 4,
            ScalarKind::U64 | ScalarKind::I64 | ScalarKind::F64 => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::U8 => "uint8",
            ScalarKind::I8 => "int8",
            ScalarKind::U16 => "uint16",
            ScalarKind::I16 => "int16",
            ScalarKind::U32 => "uint32",
            ScalarKind::I32 => "int32",
            ScalarKind::U64 => "uint64",
            ScalarKind::I64 => "int64",
            ScalarKind::F32 => "float32",
            ScalarKind::F64 => "float64",
        }
    }
}

/// A fixed-width value that can be read straight out of a buffer.
pub trait Scalar: Copy + core::fmt::Debug {
    const KIND: ScalarKind;
    const WIDTH: usize = Self::KIND.width();

    /// `bytes` holds at least `WIDTH` bytes.
    fn decode(bytes: &[u8], endian: Endian) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;

                #[inline(always)]
                fn decode(bytes: &[u8], endian: Endian) -> Self {
                    let mut raw = [0u8; core::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..core::mem::size_of::<$ty>()]);
                    match endian {
                        Endian::Little => <$ty>::from_le_bytes(raw),
                        Endian::Big => <$ty>::from_be_bytes(raw),
                    }
                }
            }
        )*
    };
}

impl_scalar!(
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
);

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    #[inline(always)]
    fn decode(bytes: &[u8], _endian: Endian) -> Self {
        bytes[0] != 0
    }
}

/// Applies a signed displacement to an absolute position.
pub(crate) fn displace(base: usize, delta: i64, len: usize) -> Result<usize> {
    let target = base as i64 + delta;
    if target < 0 || target as u64 > len as u64 {
        return Err(Error::OutOfBounds {
            offset: target,
            width: 0,
            len,
        });
    }
    Ok(target as usize)
}

/// Bounds-checked positional reader over one immutable buffer.
#[derive(Clone, Copy, Debug)]
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buf: &'a [u8], endian: Endian) -> Self {
        ReadCursor {
            buf,
            pos: 0,
            endian,
        }
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor; bounds are only enforced by the next read.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    #[inline(always)]
    pub fn slice_at(&self, pos: usize, len: usize) -> Result<&'a [u8]> {
        match pos.checked_add(len) {
            Some(end) if end <= self.buf.len() => Ok(&self.buf[pos..end]),
            _ => Err(Error::OutOfBounds {
                offset: pos as i64,
                width: len,
                len: self.buf.len(),
            }),
        }
    }

    #[inline(always)]
    pub fn slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let slice = self.slice_at(self.pos, len)?;
        self.pos += len;
        Ok(slice)
    }

    #[inline(always)]
    pub fn peek_at<T: Scalar>(&self, pos: usize) -> Result<T> {
        Ok(T::decode(self.slice_at(pos, T::WIDTH)?, self.endian))
    }

    #[inline(always)]
    pub fn read<T: Scalar>(&mut self) -> Result<T> {
        let value = self.peek_at::<T>(self.pos)?;
        self.pos += T::WIDTH;
        Ok(value)
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.read()
    }

    pub fn i8(&mut self) -> Result<i8> {
        self.read()
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.read()
    }

    pub fn i16(&mut self) -> Result<i16> {
        self.read()
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.read()
    }

    pub fn i32(&mut self) -> Result<i32> {
        self.read()
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.read()
    }

    pub fn i64(&mut self) -> Result<i64> {
        self.read()
    }

    pub fn f32(&mut self) -> Result<f32> {
        self.read()
    }

    pub fn f64(&mut self) -> Result<f64> {
        self.read()
    }

    pub fn bool(&mut self) -> Result<bool> {
        self.read()
    }
}
