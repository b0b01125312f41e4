use crate::error::{ErrorKind, Result};
use crate::CHUNK_SIZE;

/// Smallest ring allocated for a data-bearing stream
const MIN_RING_SIZE: usize = 32;

/// Power-of-two circular buffer holding the LZ77 window
///
/// The ring starts unallocated and grows (before it ever wraps) to cover
/// the bytes announced so far, capped at the stream's window size. Each
/// time the write position wraps, the full ring drains into the output
/// accumulator, so every decoded byte lands there exactly once.
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Vec<u8>,
    /// Upper bound on the ring size (2^WBITS)
    max_size: usize,
    /// Next write position
    pos: usize,
    /// Total bytes ever written
    total_written: usize,
    output: Vec<u8>,
}

impl RingBuffer {
    pub fn new(window_bits: u8) -> Self {
        Self { buffer: Vec::new(), max_size: 1 << window_bits, pos: 0, total_written: 0, output: Vec::new() }
    }

    /// Make room for a meta-block that will write `upcoming` more bytes
    pub fn ensure_capacity(&mut self, upcoming: usize) -> Result<()> {
        if self.buffer.len() == self.max_size {
            return Ok(());
        }
        // Strictly larger than the data so a ring below the cap never wraps
        let needed = (self.total_written + upcoming + 1).max(MIN_RING_SIZE);
        let target = needed.checked_next_power_of_two().unwrap_or(self.max_size).min(self.max_size);
        if target <= self.buffer.len() {
            return Ok(());
        }

        let kind = if self.buffer.is_empty() { ErrorKind::AllocRingBuffer1 } else { ErrorKind::AllocRingBuffer2 };
        self.buffer.try_reserve_exact(target - self.buffer.len()).map_err(|_| kind)?;
        self.buffer.resize(target, 0);
        Ok(())
    }

    #[inline]
    fn mask(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Account for `n` bytes just placed at `pos`, draining the ring on wrap
    #[inline]
    fn advance(&mut self, n: usize) -> Result<()> {
        self.pos += n;
        self.total_written += n;
        if self.pos == self.buffer.len() {
            self.drain(self.pos)?;
            self.pos = 0;
        }
        Ok(())
    }

    /// Append `buffer[..len]` to the output, growing it in whole chunks
    fn drain(&mut self, len: usize) -> Result<()> {
        if self.output.capacity() - self.output.len() < len {
            let chunks = (len + CHUNK_SIZE - 1) / CHUNK_SIZE;
            self.output.try_reserve(chunks * CHUNK_SIZE).map_err(|_| ErrorKind::AllocRingBuffer2)?;
        }
        self.output.extend_from_slice(&self.buffer[..len]);
        Ok(())
    }

    #[inline]
    pub fn push_byte(&mut self, byte: u8) -> Result<()> {
        self.buffer[self.pos] = byte;
        self.advance(1)
    }

    /// Append bytes, splitting at the wrap point
    pub fn write(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            let n = (self.buffer.len() - self.pos).min(bytes.len());
            self.buffer[self.pos..self.pos + n].copy_from_slice(&bytes[..n]);
            bytes = &bytes[n..];
            self.advance(n)?;
        }
        Ok(())
    }

    /// Append `len` bytes produced by `fill` directly into the ring
    pub fn write_with<F>(&mut self, mut len: usize, mut fill: F) -> Result<()>
    where
        F: FnMut(&mut [u8]) -> Result<()>,
    {
        while len > 0 {
            let n = (self.buffer.len() - self.pos).min(len);
            fill(&mut self.buffer[self.pos..self.pos + n])?;
            len -= n;
            self.advance(n)?;
        }
        Ok(())
    }

    /// Copy `length` bytes starting `distance` bytes back
    ///
    /// distance=1 means the most recently written byte. Length can exceed
    /// distance, in which case the copy replicates the trailing pattern.
    pub fn copy_backward(&mut self, distance: usize, length: usize) -> Result<()> {
        debug_assert!(distance >= 1 && distance <= self.total_written.min(self.buffer.len()));

        let size = self.buffer.len();
        let mut src = (self.pos + size - distance) & self.mask();

        if distance >= length && src + length <= size && self.pos + length <= size {
            self.buffer.copy_within(src..src + length, self.pos);
            return self.advance(length);
        }

        // Overlapping or wrapping: byte at a time, in destination order
        for _ in 0..length {
            let byte = self.buffer[src];
            src = (src + 1) & self.mask();
            self.push_byte(byte)?;
        }
        Ok(())
    }

    /// The byte written `n` positions ago (1 = most recent), or 0 before the start
    #[inline]
    pub fn last_byte(&self, n: usize) -> u8 {
        if n > self.total_written {
            return 0;
        }
        self.buffer[(self.pos + self.buffer.len() - n) & self.mask()]
    }

    /// Get total bytes written
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    /// Current ring size (0 until the first data-bearing meta-block)
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Finish and return every byte written
    pub fn into_output(mut self) -> Result<Vec<u8>> {
        self.drain(self.pos)?;
        Ok(self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(window_bits: u8, upcoming: usize) -> RingBuffer {
        let mut r = RingBuffer::new(window_bits);
        r.ensure_capacity(upcoming).unwrap();
        r
    }

    #[test]
    fn test_ring_basic() {
        let mut r = ring(16, 3);
        r.write(b"ABC").unwrap();

        assert_eq!(r.last_byte(1), b'C');
        assert_eq!(r.last_byte(2), b'B');
        assert_eq!(r.last_byte(3), b'A');
        assert_eq!(r.last_byte(4), 0);
        assert_eq!(r.into_output().unwrap(), b"ABC");
    }

    #[test]
    fn test_ring_rle() {
        let mut r = ring(16, 6);
        r.push_byte(b'A').unwrap();

        // RLE case: distance=1, length=5 -> "AAAAA"
        r.copy_backward(1, 5).unwrap();
        assert_eq!(r.into_output().unwrap(), b"AAAAAA");
    }

    #[test]
    fn test_ring_overlapping_pattern() {
        let mut r = ring(16, 10);
        r.write(b"abc").unwrap();
        r.copy_backward(3, 7).unwrap();
        assert_eq!(r.into_output().unwrap(), b"abcabcabca");
    }

    #[test]
    fn test_ring_non_overlapping_copy() {
        let mut r = ring(16, 12);
        r.write(b"hello, ").unwrap();
        r.copy_backward(7, 5).unwrap();
        assert_eq!(r.into_output().unwrap(), b"hello, hello");
    }

    #[test]
    fn test_ring_lazy_size() {
        let mut r = RingBuffer::new(22);
        assert_eq!(r.capacity(), 0);
        r.ensure_capacity(100).unwrap();
        assert_eq!(r.capacity(), 128);
        r.ensure_capacity(5).unwrap();
        assert_eq!(r.capacity(), 128);
        // Capped at the window
        let mut small = RingBuffer::new(10);
        small.ensure_capacity(1 << 20).unwrap();
        assert_eq!(small.capacity(), 1024);
    }

    #[test]
    fn test_ring_growth_keeps_history() {
        let mut r = ring(16, 20);
        r.write(b"0123456789").unwrap();
        r.ensure_capacity(1000).unwrap();
        assert_eq!(r.capacity(), 1024);
        r.copy_backward(10, 10).unwrap();
        assert_eq!(r.into_output().unwrap(), b"01234567890123456789");
    }

    #[test]
    fn test_ring_wrap_drains_to_output() {
        // 1 KiB window, 3000 bytes: wraps twice
        let data: Vec<u8> = (0..3000u32).map(|i| (i * 7 % 251) as u8).collect();
        let mut r = ring(10, data.len());
        assert_eq!(r.capacity(), 1024);
        r.write(&data[..1500]).unwrap();
        for &b in &data[1500..2000] {
            r.push_byte(b).unwrap();
        }
        r.write(&data[2000..]).unwrap();
        assert_eq!(r.total_written(), 3000);
        assert_eq!(r.last_byte(1), data[2999]);
        assert_eq!(r.into_output().unwrap(), data);
    }

    #[test]
    fn test_ring_copy_across_wrap() {
        let mut r = ring(5, 64);
        assert_eq!(r.capacity(), 32);
        let prefix: Vec<u8> = (0..30u8).collect();
        r.write(&prefix).unwrap();
        // Source 30..20 back, destination wraps past the end
        r.copy_backward(10, 10).unwrap();

        let mut expected = prefix.clone();
        expected.extend_from_slice(&prefix[20..30]);
        assert_eq!(r.into_output().unwrap(), expected);
    }

    #[test]
    fn test_ring_write_with() {
        let mut r = ring(5, 40);
        r.write_with(40, |chunk| {
            chunk.fill(b'z');
            Ok(())
        })
        .unwrap();
        assert_eq!(r.into_output().unwrap(), vec![b'z'; 40]);
    }
}
