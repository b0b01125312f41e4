use super::block::read_var_len_u8;
use super::tables::CONTEXT_LOOKUP;
use crate::bits::BitReader;
use crate::error::{ErrorKind, Result};
use crate::huffman::{read_prefix_code, read_symbol, tables::max_table_size};

/// How the previous two bytes select a literal context
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ContextMode {
    Lsb6 = 0,
    Msb6 = 1,
    Utf8 = 2,
    Signed = 3,
}

impl ContextMode {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => Self::Lsb6,
            1 => Self::Msb6,
            2 => Self::Utf8,
            _ => Self::Signed,
        }
    }

    /// Literal context id 0-63 from the last byte `p1` and the one before it `p2`
    #[inline]
    pub fn context(self, p1: u8, p2: u8) -> usize {
        let base = (self as usize) << 9;
        (CONTEXT_LOOKUP[base + p1 as usize] | CONTEXT_LOOKUP[base + 256 + p2 as usize]) as usize
    }
}

/// Read `count` 2-bit context modes
pub fn read_context_modes(bits: &mut BitReader, count: usize) -> Result<Vec<ContextMode>> {
    let mut modes = Vec::new();
    modes.try_reserve_exact(count).map_err(|_| ErrorKind::AllocContextModes.at(bits.position()))?;
    for _ in 0..count {
        modes.push(ContextMode::from_bits(bits.read_bits(2)?));
    }
    Ok(modes)
}

/// A decoded context map and the number of trees it references
#[derive(Debug)]
pub struct ContextMap {
    pub map: Vec<u8>,
    pub num_trees: usize,
}

impl ContextMap {
    /// Decode a map with `size` entries
    pub fn decode(bits: &mut BitReader, size: usize) -> Result<Self> {
        let mut map = Vec::new();
        map.try_reserve_exact(size).map_err(|_| ErrorKind::AllocContextMap.at(bits.position()))?;
        map.resize(size, 0);

        let num_trees = read_var_len_u8(bits)? + 1;
        if num_trees == 1 {
            return Ok(Self { map, num_trees });
        }

        let max_run_prefix = if bits.read_bit()? { bits.read_bits(4)? as usize + 1 } else { 0 };
        let alphabet = num_trees + max_run_prefix;
        let mut table = vec![0u32; max_table_size(alphabet)];
        read_prefix_code(bits, alphabet, alphabet, &mut table)?;

        let mut i = 0;
        while i < size {
            let code = read_symbol(&table, bits)? as usize;
            if code == 0 {
                map[i] = 0;
                i += 1;
            } else if code <= max_run_prefix {
                let run = (1 << code) + bits.read_bits(code as u8)? as usize;
                if i + run > size {
                    return Err(ErrorKind::FormatContextMapRepeat.at(bits.position()));
                }
                map[i..i + run].fill(0);
                i += run;
            } else {
                map[i] = (code - max_run_prefix) as u8;
                i += 1;
            }
        }

        if bits.read_bit()? {
            inverse_move_to_front(&mut map);
        }
        Ok(Self { map, num_trees })
    }
}

/// Undo move-to-front coding in place
pub fn inverse_move_to_front(values: &mut [u8]) {
    let mut mtf: [u8; 256] = std::array::from_fn(|i| i as u8);
    for v in values.iter_mut() {
        let index = *v as usize;
        let value = mtf[index];
        *v = value;
        if index != 0 {
            mtf.copy_within(0..index, 1);
            mtf[0] = value;
        }
    }
}
