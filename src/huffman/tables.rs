/// Root table width for every prefix code except the code length code
pub const HUFFMAN_TABLE_BITS: u8 = 8;

/// Longest code length the format allows
pub const MAX_CODE_LENGTH: usize = 15;

/// Size of the code length alphabet (0-15 literal lengths, 16 repeat, 17 zeros)
pub const CODE_LENGTH_CODES: usize = 18;

/// Root width of the code length code table (its codes are at most 5 bits)
pub const CODE_LENGTH_TABLE_BITS: u8 = 5;

/// Code length assumed for repeat code 16 before any nonzero length was seen
pub const INITIAL_REPEATED_CODE_LENGTH: u8 = 8;

/// Order in which code length code lengths are transmitted
pub const CODE_LENGTH_CODE_ORDER: [usize; CODE_LENGTH_CODES] =
    [1, 2, 3, 4, 0, 5, 17, 6, 16, 7, 8, 9, 10, 11, 12, 13, 14, 15];

/// Static prefix code for code length code lengths, indexed by the next 4 bits
///
/// (bits consumed, code length)
pub const CODE_LENGTH_CODE_LENGTHS: [(u8, u8); 16] = [
    (2, 0),
    (2, 4),
    (2, 3),
    (3, 2),
    (2, 0),
    (2, 4),
    (2, 3),
    (4, 1),
    (2, 0),
    (2, 4),
    (2, 3),
    (3, 2),
    (2, 0),
    (2, 4),
    (2, 3),
    (4, 5),
];

/// Upper bound on the two-level table size for an 8-bit root, indexed by
/// `(alphabet_size + 31) >> 5`
pub const MAX_HUFFMAN_TABLE_SIZE: [usize; 23] = [
    256, 402, 436, 468, 500, 534, 566, 598, 630, 662, 694, 726, 758, 790, 822, 854, 886, 920, 952,
    984, 1016, 1048, 1080,
];

/// Table size bound for an alphabet of `alphabet_size` symbols
pub fn max_table_size(alphabet_size: usize) -> usize {
    let idx = ((alphabet_size + 31) >> 5).min(MAX_HUFFMAN_TABLE_SIZE.len() - 1);
    MAX_HUFFMAN_TABLE_SIZE[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_length_order_is_permutation() {
        let mut seen = [false; CODE_LENGTH_CODES];
        for &idx in &CODE_LENGTH_CODE_ORDER {
            assert!(!seen[idx]);
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_code_length_code_is_complete() {
        // Each 4-bit window decodes to a code whose bits match the window prefix,
        // and the distinct codes exactly fill the code space.
        let mut space = 0u32;
        for (p, &(bits, value)) in CODE_LENGTH_CODE_LENGTHS.iter().enumerate() {
            if p < (1 << bits) {
                space += 16 >> bits;
            }
            let canonical = CODE_LENGTH_CODE_LENGTHS[p & ((1 << bits) - 1)];
            assert_eq!(canonical, (bits, value));
        }
        assert_eq!(space, 16);
    }

    #[test]
    fn test_max_table_size() {
        assert_eq!(max_table_size(256), 630);
        assert_eq!(max_table_size(704), 1080);
        assert_eq!(max_table_size(26), 402);
    }
}
