use crate::bits::BitReader;
use crate::error::{ErrorKind, Result};

/// Smallest and largest WBITS of a large-window stream
pub const LARGE_MIN_WINDOW_BITS: u32 = 10;
pub const LARGE_MAX_WINDOW_BITS: u32 = 30;

/// Window parameters from the stream header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowBits {
    pub bits: u8,
    /// Set when the stream uses the large-window header
    pub large: bool,
}

impl WindowBits {
    fn regular(bits: u8) -> Self {
        Self { bits, large: false }
    }
}

/// Decode WBITS from the stream header
///
/// The pattern reserved for large windows is only accepted when
/// `large_window` is enabled.
pub fn read_window_bits(bits: &mut BitReader, large_window: bool) -> Result<WindowBits> {
    if !bits.read_bit()? {
        return Ok(WindowBits::regular(16));
    }
    let n = bits.read_bits(3)?;
    if n != 0 {
        return Ok(WindowBits::regular(17 + n as u8));
    }
    let n = bits.read_bits(3)?;
    match n {
        0 => Ok(WindowBits::regular(17)),
        1 => {
            if !large_window || bits.read_bit()? {
                return Err(ErrorKind::FormatWindowBits.at(bits.position()));
            }
            let n = bits.read_bits(6)?;
            if !(LARGE_MIN_WINDOW_BITS..=LARGE_MAX_WINDOW_BITS).contains(&n) {
                return Err(ErrorKind::FormatWindowBits.at(bits.position()));
            }
            Ok(WindowBits { bits: n as u8, large: true })
        }
        _ => Ok(WindowBits::regular(8 + n as u8)),
    }
}

/// What follows a meta-block header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaBlockKind {
    /// ISLAST with ISLASTEMPTY: the stream ends here
    LastEmpty,
    /// MLEN bytes of metadata to skip
    Metadata,
    /// MLEN raw bytes
    Uncompressed,
    /// Prefix-coded commands producing MLEN bytes
    Compressed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetaBlockHeader {
    pub is_last: bool,
    pub kind: MetaBlockKind,
    /// MLEN (or the metadata skip length)
    pub length: usize,
}

impl MetaBlockHeader {
    pub fn read(bits: &mut BitReader) -> Result<Self> {
        let is_last = bits.read_bit()?;
        if is_last && bits.read_bit()? {
            return Ok(Self { is_last, kind: MetaBlockKind::LastEmpty, length: 0 });
        }

        let nibbles = bits.read_bits(2)? + 4;
        if nibbles == 7 {
            if bits.read_bit()? {
                return Err(ErrorKind::FormatReserved.at(bits.position()));
            }
            let skip_bytes = bits.read_bits(2)?;
            let mut length = 0usize;
            for i in 0..skip_bytes {
                let byte = bits.read_bits(8)?;
                if byte == 0 && i + 1 == skip_bytes && skip_bytes > 1 {
                    return Err(ErrorKind::FormatExuberantMetaNibble.at(bits.position()));
                }
                length |= (byte as usize) << (i * 8);
            }
            if skip_bytes > 0 {
                length += 1;
            }
            return Ok(Self { is_last, kind: MetaBlockKind::Metadata, length });
        }

        let mut length = 0usize;
        for i in 0..nibbles {
            let nibble = bits.read_bits(4)?;
            if nibble == 0 && i + 1 == nibbles && nibbles > 4 {
                return Err(ErrorKind::FormatExuberantNibble.at(bits.position()));
            }
            length |= (nibble as usize) << (i * 4);
        }
        length += 1;

        let kind = if !is_last && bits.read_bit()? { MetaBlockKind::Uncompressed } else { MetaBlockKind::Compressed };
        Ok(Self { is_last, kind, length })
    }
}
