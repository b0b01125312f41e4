use super::builder::build_table;
use super::tables::{
    max_table_size, CODE_LENGTH_CODES, CODE_LENGTH_CODE_LENGTHS, CODE_LENGTH_CODE_ORDER,
    CODE_LENGTH_TABLE_BITS, HUFFMAN_TABLE_BITS, INITIAL_REPEATED_CODE_LENGTH,
};
use crate::bits::BitReader;
use crate::error::{ErrorKind, Result};

/// Decode one symbol from a two-level table starting at `table[0]`
#[inline]
pub fn read_symbol(table: &[u32], bits: &mut BitReader) -> Result<u32> {
    let peeked = bits.peek_bits(15) as usize;
    let mut idx = peeked & 0xFF;
    let entry = table[idx];
    let n = (entry >> 16) as u8;
    if n <= HUFFMAN_TABLE_BITS {
        bits.consume_bits(n)?;
        return Ok(entry & 0xFFFF);
    }

    idx += (entry & 0xFFFF) as usize;
    idx += (peeked & ((1 << n) - 1)) >> HUFFMAN_TABLE_BITS;
    let entry = table[idx];
    bits.consume_bits((entry >> 16) as u8 + HUFFMAN_TABLE_BITS)?;
    Ok(entry & 0xFFFF)
}

/// Read one prefix code description and build its table into `table`
///
/// `alphabet_max` decides the symbol width of simple codes; `alphabet_limit`
/// bounds the symbols that may actually appear. Returns the table size.
pub fn read_prefix_code(
    bits: &mut BitReader,
    alphabet_max: usize,
    alphabet_limit: usize,
    table: &mut [u32],
) -> Result<usize> {
    let hskip = bits.read_bits(2)? as usize;
    if hskip == 1 {
        read_simple_code(bits, alphabet_max, alphabet_limit, table)
    } else {
        read_complex_code(bits, hskip, alphabet_limit, table)
    }
}

fn read_simple_code(
    bits: &mut BitReader,
    alphabet_max: usize,
    alphabet_limit: usize,
    table: &mut [u32],
) -> Result<usize> {
    let symbol_bits = 1 + (alphabet_max - 1).ilog2() as u8;
    let num_symbols = bits.read_bits(2)? as usize + 1;

    let mut symbols = [0usize; 4];
    for slot in symbols.iter_mut().take(num_symbols) {
        let symbol = bits.read_bits(symbol_bits)? as usize;
        if symbol >= alphabet_limit {
            return Err(ErrorKind::FormatSimpleHuffmanAlphabet.at(bits.position()));
        }
        *slot = symbol;
    }
    for i in 0..num_symbols {
        if symbols[i + 1..num_symbols].contains(&symbols[i]) {
            return Err(ErrorKind::FormatSimpleHuffmanSame.at(bits.position()));
        }
    }

    let lengths: &[u8] = match num_symbols {
        1 => &[1],
        2 => &[1, 1],
        3 => &[1, 2, 2],
        _ => {
            if bits.read_bit()? {
                &[1, 2, 3, 3]
            } else {
                &[2, 2, 2, 2]
            }
        }
    };

    let mut code_lengths = vec![0u8; alphabet_limit];
    for (&symbol, &len) in symbols.iter().zip(lengths) {
        code_lengths[symbol] = len;
    }
    Ok(build_table(table, HUFFMAN_TABLE_BITS, &code_lengths))
}

fn read_complex_code(
    bits: &mut BitReader,
    skip: usize,
    alphabet_limit: usize,
    table: &mut [u32],
) -> Result<usize> {
    let mut cl_lengths = [0u8; CODE_LENGTH_CODES];
    let mut space = 32i32;
    let mut num_codes = 0;

    for &idx in &CODE_LENGTH_CODE_ORDER[skip..] {
        if space <= 0 {
            break;
        }
        let (n, len) = CODE_LENGTH_CODE_LENGTHS[bits.peek_bits(4) as usize];
        bits.consume_bits(n)?;
        cl_lengths[idx] = len;
        if len != 0 {
            space -= 32 >> len;
            num_codes += 1;
        }
    }

    if space != 0 && num_codes != 1 {
        return Err(ErrorKind::FormatClSpace.at(bits.position()));
    }

    let code_lengths = read_code_lengths(bits, &cl_lengths, alphabet_limit)?;
    Ok(build_table(table, HUFFMAN_TABLE_BITS, &code_lengths))
}

/// Decode `num_symbols` code lengths with the code length code
fn read_code_lengths(
    bits: &mut BitReader,
    cl_lengths: &[u8; CODE_LENGTH_CODES],
    num_symbols: usize,
) -> Result<Vec<u8>> {
    let mut cl_table = [0u32; 1 << CODE_LENGTH_TABLE_BITS];
    build_table(&mut cl_table, CODE_LENGTH_TABLE_BITS, cl_lengths);

    let mut lengths = vec![0u8; num_symbols];
    let mut symbol = 0;
    let mut prev_len = INITIAL_REPEATED_CODE_LENGTH;
    let mut repeat = 0usize;
    let mut repeat_len = 0u8;
    let mut space = 32768i32;

    while symbol < num_symbols && space > 0 {
        let entry = cl_table[bits.peek_bits(CODE_LENGTH_TABLE_BITS) as usize];
        bits.consume_bits((entry >> 16) as u8)?;
        let code = (entry & 0xFFFF) as u8;

        if code < 16 {
            repeat = 0;
            lengths[symbol] = code;
            symbol += 1;
            if code != 0 {
                prev_len = code;
                space -= 32768 >> code;
            }
            continue;
        }

        // 16 repeats the previous nonzero length, 17 repeats zero
        let extra_bits = code - 14;
        let new_len = if code == 16 { prev_len } else { 0 };
        if repeat_len != new_len {
            repeat = 0;
            repeat_len = new_len;
        }
        let old_repeat = repeat;
        if repeat > 0 {
            repeat = (repeat - 2) << extra_bits;
        }
        repeat += bits.read_bits(extra_bits)? as usize + 3;
        let delta = repeat - old_repeat;
        if symbol + delta > num_symbols {
            return Err(ErrorKind::FormatHuffmanSpace.at(bits.position()));
        }
        lengths[symbol..symbol + delta].fill(repeat_len);
        symbol += delta;
        if repeat_len != 0 {
            space -= (delta << (15 - repeat_len)) as i32;
        }
    }

    if space != 0 {
        return Err(ErrorKind::FormatHuffmanSpace.at(bits.position()));
    }
    Ok(lengths)
}

/// All prefix codes of one category, packed back to back in one array
///
/// Each tree owns at most `max_table_size(alphabet_limit)` slots.
#[derive(Debug, Default)]
pub struct HuffmanTreeGroup {
    codes: Vec<u32>,
    offsets: Vec<usize>,
}

impl HuffmanTreeGroup {
    /// Read `num_trees` consecutive prefix codes
    ///
    /// `alloc_error` is reported if the packed table cannot be allocated.
    pub fn decode(
        bits: &mut BitReader,
        alphabet_max: usize,
        alphabet_limit: usize,
        num_trees: usize,
        alloc_error: ErrorKind,
    ) -> Result<Self> {
        let max_size = max_table_size(alphabet_limit);
        let capacity = max_size * num_trees;

        let mut codes = Vec::new();
        codes.try_reserve_exact(capacity).map_err(|_| alloc_error.at(bits.position()))?;
        codes.resize(capacity, 0);
        let mut offsets = Vec::new();
        offsets.try_reserve_exact(num_trees).map_err(|_| alloc_error.at(bits.position()))?;

        let mut next = 0;
        for _ in 0..num_trees {
            offsets.push(next);
            next += read_prefix_code(bits, alphabet_max, alphabet_limit, &mut codes[next..next + max_size])?;
        }
        codes.truncate(next);

        Ok(Self { codes, offsets })
    }

    /// Decode one symbol with tree `tree`
    #[inline]
    pub fn read_symbol(&self, tree: usize, bits: &mut BitReader) -> Result<u32> {
        read_symbol(&self.codes[self.offsets[tree]..], bits)
    }

    pub fn num_trees(&self) -> usize {
        self.offsets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitWriter;

    #[test]
    fn test_simple_single_symbol() {
        let mut w = BitWriter::new();
        w.write_bits(1, 2); // simple
        w.write_bits(0, 2); // NSYM - 1
        w.write_bits(65, 8); // symbol
        w.write_bits(0xFF, 8);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let g = HuffmanTreeGroup::decode(&mut reader, 256, 256, 1, ErrorKind::AllocTreeGroups).unwrap();
        // Zero-bit code: nothing consumed per symbol
        for _ in 0..5 {
            assert_eq!(g.read_symbol(0, &mut reader).unwrap(), 65);
        }
        assert_eq!(reader.read_bits(8).unwrap(), 0xFF);
    }

    #[test]
    fn test_simple_two_symbols() {
        let mut w = BitWriter::new();
        w.write_bits(1, 2);
        w.write_bits(1, 2);
        w.write_bits(200, 8);
        w.write_bits(3, 8);
        // Sorted by value: 3 gets code 0, 200 gets code 1
        for bit in [0, 1, 1, 0] {
            w.write_bit(bit == 1);
        }
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let g = HuffmanTreeGroup::decode(&mut reader, 256, 256, 1, ErrorKind::AllocTreeGroups).unwrap();
        let decoded: Vec<u32> = (0..4).map(|_| g.read_symbol(0, &mut reader).unwrap()).collect();
        assert_eq!(decoded, vec![3, 200, 200, 3]);
    }

    #[test]
    fn test_simple_four_symbols_tree_select() {
        let mut w = BitWriter::new();
        w.write_bits(1, 2);
        w.write_bits(3, 2);
        for s in [10u32, 20, 30, 40] {
            w.write_bits(s, 8);
        }
        w.write_bit(true); // lengths {1,2,3,3}
        // 10 "0", 20 "10", 30 "110", 40 "111"
        for bit in [true, true, true, false, true, false] {
            w.write_bit(bit);
        }
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let g = HuffmanTreeGroup::decode(&mut reader, 256, 256, 1, ErrorKind::AllocTreeGroups).unwrap();
        let decoded: Vec<u32> = (0..3).map(|_| g.read_symbol(0, &mut reader).unwrap()).collect();
        assert_eq!(decoded, vec![40, 10, 20]);
    }

    #[test]
    fn test_simple_symbol_outside_alphabet() {
        let mut w = BitWriter::new();
        w.write_bits(1, 2);
        w.write_bits(0, 2);
        w.write_bits(30, 5); // alphabet 26 uses 5-bit symbols
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let err = HuffmanTreeGroup::decode(&mut reader, 26, 26, 1, ErrorKind::AllocTreeGroups).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatSimpleHuffmanAlphabet);
    }

    #[test]
    fn test_simple_duplicate_symbols() {
        let mut w = BitWriter::new();
        w.write_bits(1, 2);
        w.write_bits(2, 2);
        w.write_bits(7, 8);
        w.write_bits(9, 8);
        w.write_bits(7, 8);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let err = HuffmanTreeGroup::decode(&mut reader, 256, 256, 1, ErrorKind::AllocTreeGroups).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatSimpleHuffmanSame);
    }

    /// Complex code whose code length code has one symbol, so every code
    /// length decodes to `length_symbol` without consuming bits
    fn write_single_length_complex(w: &mut BitWriter, length_symbol: usize) {
        w.write_bits(0, 2); // HSKIP 0
        for &idx in &CODE_LENGTH_CODE_ORDER {
            if idx == length_symbol {
                w.write_bits(0b0111, 4); // length 1
            } else {
                w.write_bits(0b00, 2); // length 0
            }
        }
    }

    #[test]
    fn test_complex_flat_code() {
        // 256 literals, each with code length 8
        let mut w = BitWriter::new();
        write_single_length_complex(&mut w, 8);
        // Canonical 8-bit codes equal the symbol value, sent MSB first
        for &sym in &[0x41u8, 0x80] {
            w.write_bits(sym.reverse_bits() as u32, 8);
        }
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let g = HuffmanTreeGroup::decode(&mut reader, 256, 256, 1, ErrorKind::AllocTreeGroups).unwrap();
        assert_eq!(g.read_symbol(0, &mut reader).unwrap(), 0x41);
        assert_eq!(g.read_symbol(0, &mut reader).unwrap(), 0x80);
    }

    #[test]
    fn test_complex_code_length_space() {
        // Two code length codes of length 2 leave the space under-full
        let mut w = BitWriter::new();
        w.write_bits(0, 2);
        w.write_bits(0b011, 3); // idx 1: length 2
        w.write_bits(0b011, 3); // idx 2: length 2
        for _ in 2..CODE_LENGTH_CODES {
            w.write_bits(0b00, 2);
        }
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let err = HuffmanTreeGroup::decode(&mut reader, 256, 256, 1, ErrorKind::AllocTreeGroups).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatClSpace);
    }

    /// Code length code {1: "0", 2: "1"}; each following bit picks length 1 or 2
    fn write_one_two_lengths(w: &mut BitWriter, lengths: &[u8]) {
        w.write_bits(0, 2);
        w.write_bits(0b0111, 4); // idx 1: length 1
        w.write_bits(0b0111, 4); // idx 2: length 1, space now full
        for &len in lengths {
            w.write_bit(len == 2);
        }
    }

    #[test]
    fn test_complex_code_lengths_complete() {
        let mut w = BitWriter::new();
        // Lengths {1,2,2}: complete after three symbols, the fourth stays unused
        write_one_two_lengths(&mut w, &[1, 2, 2]);
        // symbol 0 "0", symbol 1 "10", symbol 2 "11"
        for bit in [true, true, false, true, false] {
            w.write_bit(bit);
        }
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let g = HuffmanTreeGroup::decode(&mut reader, 4, 4, 1, ErrorKind::AllocTreeGroups).unwrap();
        let decoded: Vec<u32> = (0..3).map(|_| g.read_symbol(0, &mut reader).unwrap()).collect();
        assert_eq!(decoded, vec![2, 0, 1]);
    }

    #[test]
    fn test_complex_code_lengths_undersubscribed() {
        let mut w = BitWriter::new();
        write_one_two_lengths(&mut w, &[2, 2, 2]);
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let err = HuffmanTreeGroup::decode(&mut reader, 3, 3, 1, ErrorKind::AllocTreeGroups).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatHuffmanSpace);
    }

    #[test]
    fn test_complex_repeat_overrun() {
        // Code length code {0: "0", 17: "1"}: one zero, then a zero-run of at least 3 on 3 symbols
        let mut w = BitWriter::new();
        w.write_bits(0, 2);
        // Order starts 1,2,3,4,0,5,17; the space fills at 17
        for &idx in CODE_LENGTH_CODE_ORDER.iter().take(7) {
            if idx == 0 || idx == 17 {
                w.write_bits(0b0111, 4);
            } else {
                w.write_bits(0b00, 2);
            }
        }
        w.write_bit(false); // length 0
        w.write_bit(true); // 17
        w.write_bits(0, 3); // 3 zeros: 1 + 3 > 3
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let err = HuffmanTreeGroup::decode(&mut reader, 3, 3, 1, ErrorKind::AllocTreeGroups).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatHuffmanSpace);
    }

    #[test]
    fn test_multiple_trees_are_independent() {
        let mut w = BitWriter::new();
        for sym in [5u32, 9] {
            w.write_bits(1, 2);
            w.write_bits(0, 2);
            w.write_bits(sym, 4); // alphabet 16 -> 4-bit symbols
        }
        let data = w.finish();

        let mut reader = BitReader::new(&data);
        let g = HuffmanTreeGroup::decode(&mut reader, 16, 16, 2, ErrorKind::AllocTreeGroups).unwrap();
        assert_eq!(g.num_trees(), 2);
        assert_eq!(g.read_symbol(0, &mut reader).unwrap(), 5);
        assert_eq!(g.read_symbol(1, &mut reader).unwrap(), 9);
    }
}
