use crate::error::{ErrorKind, Result};

/// Bit-level reader over a complete Brotli stream
///
/// Brotli uses LSB-first bit ordering within bytes, like DEFLATE.
/// Running out of input is a hard error: a single-shot decode never
/// waits for more data.
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Next byte of `data` to load into the buffer
    next_byte: usize,
    /// Buffer holding up to 64 bits
    buffer: u64,
    /// Number of valid bits in buffer (0-64)
    bits_available: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, next_byte: 0, buffer: 0, bits_available: 0 }
    }

    /// Top up the buffer with whole bytes while there is room
    #[inline]
    fn refill(&mut self) {
        while self.bits_available <= 56 && self.next_byte < self.data.len() {
            self.buffer |= (self.data[self.next_byte] as u64) << self.bits_available;
            self.next_byte += 1;
            self.bits_available += 8;
        }
    }

    fn eof(&self) -> crate::error::Error {
        ErrorKind::InvalidArguments.at(self.data.len())
    }

    /// Read `n` bits (0-32) in LSB-first order
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        debug_assert!(n <= 32, "Cannot read more than 32 bits at once");

        if n == 0 {
            return Ok(0);
        }

        if self.bits_available < n {
            self.refill();
            if self.bits_available < n {
                return Err(self.eof());
            }
        }

        let mask = (1u64 << n) - 1;
        let result = (self.buffer & mask) as u32;
        self.buffer >>= n;
        self.bits_available -= n;

        Ok(result)
    }

    /// Peek at `n` bits without consuming them (for table-based Huffman decoding)
    ///
    /// Bits past the end of the input read as zero; only consuming them fails.
    #[inline]
    pub fn peek_bits(&mut self, n: u8) -> u32 {
        debug_assert!(n <= 32, "Cannot peek more than 32 bits at once");

        if self.bits_available < n {
            self.refill();
        }

        let mask = (1u64 << n) - 1;
        (self.buffer & mask) as u32
    }

    /// Consume `n` bits that were previously peeked
    #[inline]
    pub fn consume_bits(&mut self, n: u8) -> Result<()> {
        if n > self.bits_available {
            return Err(self.eof());
        }
        self.buffer >>= n;
        self.bits_available -= n;
        Ok(())
    }

    /// Read a single bit
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Discard remaining bits in current byte, align to next byte boundary
    ///
    /// Returns the discarded bits so callers can verify zero padding.
    pub fn align_to_byte(&mut self) -> u32 {
        let discard = self.bits_available % 8;
        if discard == 0 {
            return 0;
        }
        let padding = (self.buffer & ((1u64 << discard) - 1)) as u32;
        self.buffer >>= discard;
        self.bits_available -= discard;
        padding
    }

    /// Fill `buf` with whole bytes (must be byte-aligned)
    ///
    /// Buffered bytes are drained first, then the rest is copied straight
    /// from the input slice.
    pub fn read_aligned_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        debug_assert!(self.bits_available % 8 == 0, "read_aligned_bytes requires alignment");

        let mut filled = 0;
        while filled < buf.len() && self.bits_available >= 8 {
            buf[filled] = self.buffer as u8;
            self.buffer >>= 8;
            self.bits_available -= 8;
            filled += 1;
        }

        let rest = buf.len() - filled;
        if rest > self.data.len() - self.next_byte {
            return Err(self.eof());
        }
        buf[filled..].copy_from_slice(&self.data[self.next_byte..self.next_byte + rest]);
        self.next_byte += rest;
        Ok(())
    }

    /// Skip `n` whole bytes (must be byte-aligned)
    pub fn skip_aligned_bytes(&mut self, n: usize) -> Result<()> {
        debug_assert!(self.bits_available % 8 == 0, "skip_aligned_bytes requires alignment");

        let buffered = (self.bits_available / 8) as usize;
        if n < buffered {
            self.buffer >>= 8 * n as u32;
            self.bits_available -= 8 * n as u8;
            return Ok(());
        }

        let rest = n - buffered;
        self.buffer = 0;
        self.bits_available = 0;
        if rest > self.data.len() - self.next_byte {
            return Err(self.eof());
        }
        self.next_byte += rest;
        Ok(())
    }

    /// Byte offset of the next unread bit (rounded down)
    pub fn position(&self) -> usize {
        self.next_byte - (self.bits_available / 8) as usize
    }
}
