/// LSB-first bit packer for building Brotli streams by hand in tests
pub struct BitWriter {
    bytes: Vec<u8>,
    /// Pending bits not yet flushed to `bytes`
    acc: u64,
    acc_bits: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self { bytes: Vec::new(), acc: 0, acc_bits: 0 }
    }

    /// Append the low `n` bits (0-32) of `value`
    pub fn write_bits(&mut self, value: u32, n: u8) {
        debug_assert!(n <= 32);

        let value = (value as u64) & ((1u64 << n) - 1);
        self.acc |= value << self.acc_bits;
        self.acc_bits += n;
        while self.acc_bits >= 8 {
            self.bytes.push(self.acc as u8);
            self.acc >>= 8;
            self.acc_bits -= 8;
        }
    }

    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u32, 1);
    }

    /// Zero-fill up to the next byte boundary
    pub fn align_to_byte(&mut self) {
        if self.acc_bits > 0 {
            self.bytes.push(self.acc as u8);
            self.acc = 0;
            self.acc_bits = 0;
        }
    }

    /// Align, then append raw bytes (uncompressed and metadata bodies)
    pub fn write_aligned_bytes(&mut self, bytes: &[u8]) {
        self.align_to_byte();
        self.bytes.extend_from_slice(bytes);
    }

    /// A simple prefix code with one symbol, which then decodes with zero bits
    pub fn write_single_symbol_code(&mut self, symbol: u32, alphabet_size: usize) {
        self.write_bits(1, 2); // HSKIP = 1: simple code
        self.write_bits(0, 2); // NSYM - 1
        self.write_bits(symbol, 1 + (alphabet_size - 1).ilog2() as u8);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitReader;

    #[test]
    fn test_lsb_first_packing() {
        let mut w = BitWriter::new();
        w.write_bits(0b011, 3);
        w.write_bits(0b11010, 5);
        w.write_bits(0xABC, 12);
        assert_eq!(w.finish(), vec![0xD3, 0xBC, 0x0A]);
    }

    #[test]
    fn test_aligned_bytes_follow_padding() {
        let mut w = BitWriter::new();
        w.write_bit(true);
        w.write_aligned_bytes(b"hi");
        assert_eq!(w.finish(), vec![0x01, b'h', b'i']);
    }

    #[test]
    fn test_reader_sees_written_fields() {
        let mut w = BitWriter::new();
        w.write_bits(5, 3);
        w.write_bits(0xFFFF_FFFF, 32);
        w.write_single_symbol_code(138, 704);
        let data = w.finish();

        let mut r = BitReader::new(&data);
        assert_eq!(r.read_bits(3).unwrap(), 5);
        assert_eq!(r.read_bits(32).unwrap(), 0xFFFF_FFFF);
        assert_eq!(r.read_bits(2).unwrap(), 1);
        assert_eq!(r.read_bits(2).unwrap(), 0);
        assert_eq!(r.read_bits(10).unwrap(), 138);
    }
}
