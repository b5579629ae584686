use core::fmt::{Display, Formatter};

/// Failures raised while decoding a buffer.
///
/// An absent table field is not an error; it is simply missing from the
/// decoded [`Object`](crate::reflection::Object).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A read of `width` bytes at `offset` crosses the end of a `len` byte buffer,
    /// or an indirection resolved to a position before the buffer start.
    OutOfBounds { offset: i64, width: usize, len: usize },
    /// `object()` was asked for a type that was never registered.
    UnknownType(String),
    /// The vtable at `offset` declares a byte size that cannot describe a vtable.
    MalformedVtable { offset: usize, size: u16 },
    /// String bytes at `offset` are not valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// Objects are nested deeper than the configured limit.
    DepthExceeded { limit: usize },
    /// The buffer's file identifier differs from the expected one.
    IdentifierMismatch { expected: [u8; 4], found: [u8; 4] },
}

pub type Result<T> = core::result::Result<T, Error>;

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::OutOfBounds { offset, width, len } => write!(
                f,
                "read of {} bytes at offset {} is out of bounds for a buffer of {} bytes",
                width, offset, len
            ),
            Error::UnknownType(name) => write!(f, "type `{}` is not registered", name),
            Error::MalformedVtable { offset, size } => {
                write!(f, "malformed vtable at offset {}: byte size {}", offset, size)
            }
            Error::InvalidUtf8 { offset } => {
                write!(f, "string at offset {} is not valid UTF-8", offset)
            }
            Error::DepthExceeded { limit } => {
                write!(f, "object nesting exceeds the limit of {}", limit)
            }
            Error::IdentifierMismatch { expected, found } => write!(
                f,
                "file identifier mismatch: expected {:?}, found {:?}",
                String::from_utf8_lossy(expected),
                String::from_utf8_lossy(found)
            ),
        }
    }
}
