/// Byte order of every multi-byte scalar in a buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// How `string()` turns length-prefixed bytes into text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Borrow the bytes as `&str`; invalid UTF-8 is an error.
    #[default]
    Utf8,
    /// Replace invalid sequences with U+FFFD.
    Utf8Lossy,
    /// One byte per character. Only correct for Latin-1 text.
    Latin1,
}

pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    pub endian: Endian,
    pub text: TextEncoding,
    /// Maximum nesting of `object()` calls, guards self-referential schemas.
    pub max_depth: usize,
    /// Flush the vtable cache once it holds this many entries. `None` never flushes.
    pub vtable_cache_limit: Option<usize>,
    /// The buffer starts with a `u32` byte length before the root offset.
    pub size_prefixed: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            endian: Endian::Little,
            text: TextEncoding::Utf8,
            max_depth: DEFAULT_MAX_DEPTH,
            vtable_cache_limit: None,
            size_prefixed: false,
        }
    }
}

impl DecoderOptions {
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn with_text(mut self, text: TextEncoding) -> Self {
        self.text = text;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_vtable_cache_limit(mut self, limit: usize) -> Self {
        self.vtable_cache_limit = Some(limit);
        self
    }

    pub fn with_size_prefix(mut self, size_prefixed: bool) -> Self {
        self.size_prefixed = size_prefixed;
        self
    }
}
