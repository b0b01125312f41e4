use super::tables::{
    BLOCK_LENGTH_TABLE, DISTANCE_SHORT_CODE_INDEX_OFFSET, DISTANCE_SHORT_CODE_VALUE_OFFSET, NUM_BLOCK_LENGTH_SYMBOLS,
};
use crate::bits::BitReader;
use crate::error::{ErrorKind, Result};
use crate::huffman::HuffmanTreeGroup;

/// Read a value 0-255 in the variable-length byte encoding
pub fn read_var_len_u8(bits: &mut BitReader) -> Result<usize> {
    if !bits.read_bit()? {
        return Ok(0);
    }
    let n = bits.read_bits(3)? as u8;
    if n == 0 {
        return Ok(1);
    }
    Ok(bits.read_bits(n)? as usize + (1 << n))
}

/// Block type and run length bookkeeping for one symbol category
#[derive(Debug)]
pub struct BlockTypeTracker {
    num_types: usize,
    /// Type and count codes; absent when there is a single block type
    trees: Option<(HuffmanTreeGroup, HuffmanTreeGroup)>,
    current: usize,
    /// [second to last, last] block types
    history: [usize; 2],
    /// Symbols left in the current block
    remaining: usize,
}

impl BlockTypeTracker {
    /// Read NBLTYPES and, when more than one, the codes and first block length
    pub fn decode(bits: &mut BitReader) -> Result<Self> {
        let num_types = read_var_len_u8(bits)? + 1;
        if num_types == 1 {
            return Ok(Self { num_types, trees: None, current: 0, history: [1, 0], remaining: usize::MAX });
        }

        let alloc = ErrorKind::AllocBlockTypeTrees;
        let type_tree = HuffmanTreeGroup::decode(bits, num_types + 2, num_types + 2, 1, alloc)?;
        let length_tree =
            HuffmanTreeGroup::decode(bits, NUM_BLOCK_LENGTH_SYMBOLS, NUM_BLOCK_LENGTH_SYMBOLS, 1, alloc)?;
        let remaining = read_block_length(&length_tree, bits)?;

        Ok(Self { num_types, trees: Some((type_tree, length_tree)), current: 0, history: [1, 0], remaining })
    }

    pub fn num_types(&self) -> usize {
        self.num_types
    }

    pub fn block_type(&self) -> usize {
        self.current
    }

    /// Account for one symbol of this category, switching blocks first if
    /// the current one is used up
    ///
    /// Returns true when the block type may have changed.
    #[inline]
    pub fn advance(&mut self, bits: &mut BitReader) -> Result<bool> {
        let switched = if self.remaining == 0 {
            self.switch(bits)?;
            true
        } else {
            false
        };
        self.remaining -= 1;
        Ok(switched)
    }

    fn switch(&mut self, bits: &mut BitReader) -> Result<()> {
        let Some((type_tree, length_tree)) = &self.trees else {
            return Err(ErrorKind::Unreachable.at(bits.position()));
        };

        let code = type_tree.read_symbol(0, bits)? as usize;
        self.remaining = read_block_length(length_tree, bits)?;

        let mut block_type = match code {
            0 => self.history[0],
            1 => self.history[1] + 1,
            n => n - 2,
        };
        if block_type >= self.num_types {
            block_type -= self.num_types;
        }
        self.history = [self.history[1], block_type];
        self.current = block_type;
        Ok(())
    }
}

fn read_block_length(tree: &HuffmanTreeGroup, bits: &mut BitReader) -> Result<usize> {
    let code = tree.read_symbol(0, bits)? as usize;
    let (base, extra) = BLOCK_LENGTH_TABLE[code];
    Ok(base as usize + bits.read_bits(extra)? as usize)
}

/// The last four backward distances
#[derive(Debug, Clone)]
pub struct DistanceRing {
    distances: [i64; 4],
    /// Slot of the most recent distance
    last: usize,
}

impl Default for DistanceRing {
    fn default() -> Self {
        Self { distances: [16, 15, 11, 4], last: 3 }
    }
}

impl DistanceRing {
    /// Resolve a short code 0-15 without changing the ring
    ///
    /// The result may be zero or negative for malformed streams.
    pub fn short_code(&self, code: usize) -> i64 {
        let slot = (self.last + DISTANCE_SHORT_CODE_INDEX_OFFSET[code]) & 3;
        self.distances[slot] + DISTANCE_SHORT_CODE_VALUE_OFFSET[code] as i64
    }

    /// Most recent distance
    pub fn last(&self) -> i64 {
        self.distances[self.last]
    }

    pub fn push(&mut self, distance: i64) {
        self.last = (self.last + 1) & 3;
        self.distances[self.last] = distance;
    }
}
