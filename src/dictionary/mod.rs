pub mod transform;

pub use transform::Transforms;

use crate::error::{ErrorKind, Result};

/// Maximum number of word-length buckets a dictionary may declare
pub const MAX_SIZE_BITS_ENTRIES: usize = 32;

/// Shortest word length the format can reference
pub const MIN_WORD_LENGTH: usize = 4;

/// log2 of the word count for each length in the RFC 7932 dictionary
pub const RFC_SIZE_BITS: [u8; 25] =
    [0, 0, 0, 0, 10, 10, 11, 11, 10, 10, 10, 10, 10, 9, 9, 8, 7, 7, 8, 7, 7, 6, 6, 5, 5];

/// Byte length of the RFC 7932 dictionary
pub const RFC_DICTIONARY_SIZE: usize = 122_784;

/// A static dictionary: words bucketed by length, `2^size_bits[len]` words of
/// `len` bytes each, stored back to back in increasing length order
#[derive(Debug, Clone, Copy)]
pub struct Dictionary<'a> {
    data: &'a [u8],
    size_bits: [u8; MAX_SIZE_BITS_ENTRIES],
    offsets: [usize; MAX_SIZE_BITS_ENTRIES],
}

impl<'a> Dictionary<'a> {
    /// Use `data` with the RFC 7932 bucket layout
    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        Self::with_size_bits(data, &RFC_SIZE_BITS)
    }

    /// Use `data` with a custom bucket layout
    ///
    /// `size_bits[len]` is log2 of the number of words of length `len`
    /// (0 for none). Lengths below 4 must be empty.
    pub fn with_size_bits(data: &'a [u8], size_bits: &[u8]) -> Result<Self> {
        if size_bits.len() > MAX_SIZE_BITS_ENTRIES {
            return Err(ErrorKind::InvalidArguments.into());
        }
        if size_bits.iter().take(MIN_WORD_LENGTH).any(|&b| b != 0) || size_bits.iter().any(|&b| b >= 31) {
            return Err(ErrorKind::InvalidArguments.into());
        }

        let mut bits = [0u8; MAX_SIZE_BITS_ENTRIES];
        let mut offsets = [0usize; MAX_SIZE_BITS_ENTRIES];
        let mut pos = 0u64;
        for (len, &b) in size_bits.iter().enumerate() {
            bits[len] = b;
            offsets[len] = pos as usize;
            if b != 0 {
                pos += (len as u64) << b;
                if pos > data.len() as u64 {
                    return Err(ErrorKind::FormatDictionary.into());
                }
            }
        }
        if pos != data.len() as u64 {
            return Err(ErrorKind::FormatDictionary.into());
        }

        Ok(Self { data, size_bits: bits, offsets })
    }

    /// The built-in RFC 7932 dictionary
    #[cfg(feature = "builtin-dictionary")]
    pub fn builtin() -> Option<Dictionary<'static>> {
        Dictionary::from_bytes(&brotli_decompressor::dictionary::kBrotliDictionary[..]).ok()
    }

    /// The built-in RFC 7932 dictionary (not compiled in)
    #[cfg(not(feature = "builtin-dictionary"))]
    pub fn builtin() -> Option<Dictionary<'static>> {
        None
    }

    /// log2 of the word count for `length`, 0 when there are no such words
    pub fn size_bits(&self, length: usize) -> u8 {
        self.size_bits.get(length).copied().unwrap_or(0)
    }

    /// Word `index` of length `length`
    pub fn word(&self, length: usize, index: usize) -> Option<&'a [u8]> {
        let bits = self.size_bits(length);
        if bits == 0 || index >> bits != 0 {
            return None;
        }
        let start = self.offsets[length] + index * length;
        self.data.get(start..start + length)
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}
