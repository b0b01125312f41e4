//! Single-shot Brotli (RFC 7932) decompression.
//!
//! ```no_run
//! let compressed = std::fs::read("data.br").unwrap();
//! let data = unbrotli::decompress(&compressed).unwrap();
//! ```

pub mod bits;
pub mod decoder;
pub mod dictionary;
pub mod error;
pub mod huffman;
pub mod window;

pub use decoder::Decoder;
pub use dictionary::Dictionary;
pub use error::{Error, ErrorKind, Result};

/// Granularity of output buffer growth
pub const CHUNK_SIZE: usize = 16384;

/// Configuration for decompression
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeOptions<'a> {
    /// Dictionary used instead of the built-in one
    pub custom_dictionary: Option<Dictionary<'a>>,
    /// Accept the large-window stream header (window sizes up to 2^30)
    pub large_window: bool,
}

impl<'a> DecodeOptions<'a> {
    /// The dictionary a decoder should use: the custom one, else the built-in one
    pub fn dictionary(&self) -> Option<Dictionary<'a>> {
        self.custom_dictionary.or_else(|| Dictionary::builtin())
    }
}

/// Decompress a complete Brotli stream with default options
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    decompress_with(input, &DecodeOptions::default())
}

/// Decompress a complete Brotli stream
///
/// Bytes after the final meta-block are ignored.
pub fn decompress_with(input: &[u8], options: &DecodeOptions) -> Result<Vec<u8>> {
    Decoder::new(input, options.dictionary(), options.large_window).run()
}
