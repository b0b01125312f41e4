use super::block::{BlockTypeTracker, DistanceRing};
use super::context::{read_context_modes, ContextMap, ContextMode};
use super::header::{read_window_bits, MetaBlockHeader, MetaBlockKind};
use super::tables::{
    COMMAND_LOOKUP, DISTANCE_CONTEXT_BITS, LITERAL_CONTEXT_BITS, MAX_ALLOWED_DISTANCE, MAX_DISTANCE_BITS,
    MAX_LARGE_WINDOW_DISTANCE_BITS, NUM_COMMAND_SYMBOLS, NUM_DISTANCE_SHORT_CODES, NUM_LITERAL_SYMBOLS, WINDOW_GAP,
};
use crate::bits::BitReader;
use crate::dictionary::{Dictionary, Transforms, MIN_WORD_LENGTH};
use crate::error::{ErrorKind, Result};
use crate::huffman::HuffmanTreeGroup;
use crate::window::RingBuffer;
use tracing::{debug, trace};

/// Outcome of a single decoder step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// More of the stream remains
    Continue,
    /// The final meta-block and its padding have been consumed
    Done,
}

enum State {
    StreamHeader,
    MetaBlockHeader,
    Uncompressed { length: usize, is_last: bool },
    Metadata { length: usize, is_last: bool },
    Commands(Box<MetaBlock>),
    Done,
}

/// Extra bits and base distance for every distance symbol at or above 16
struct DistanceCodes {
    postfix_bits: u8,
    extra_bits: Vec<u8>,
    offsets: Vec<u64>,
}

impl DistanceCodes {
    fn new(postfix_bits: u8, num_direct: usize, alphabet_limit: usize) -> Self {
        let mut extra_bits = vec![0u8; alphabet_limit];
        let mut offsets = vec![0u64; alphabet_limit];

        let mut i = NUM_DISTANCE_SHORT_CODES;
        for direct in 1..=num_direct as u64 {
            if i >= alphabet_limit {
                break;
            }
            offsets[i] = direct;
            i += 1;
        }

        let postfix = 1u64 << postfix_bits;
        let mut bits = 1u8;
        let mut half = 0u64;
        while i < alphabet_limit {
            let base = num_direct as u64 + ((((2 + half) << bits) - 4) << postfix_bits) + 1;
            for low in 0..postfix {
                if i >= alphabet_limit {
                    break;
                }
                extra_bits[i] = bits;
                offsets[i] = base + low;
                i += 1;
            }
            bits += half as u8;
            half ^= 1;
        }

        Self { postfix_bits, extra_bits, offsets }
    }
}

/// Number of usable distance symbols of a large-window stream
fn large_window_distance_limit(postfix_bits: u8, num_direct: usize) -> usize {
    let offset = ((MAX_ALLOWED_DISTANCE - num_direct) >> postfix_bits) + 4;
    let distance_bits = offset.ilog2() as usize - 1;
    let group = ((distance_bits - 1) << 1) | ((offset >> distance_bits) & 1);
    ((group - 1) << postfix_bits) + (1 << postfix_bits) + num_direct + NUM_DISTANCE_SHORT_CODES
}

/// Everything read from a compressed meta-block header, plus its progress
struct MetaBlock {
    is_last: bool,
    /// Bytes still to be produced
    remaining: usize,
    literal_blocks: BlockTypeTracker,
    command_blocks: BlockTypeTracker,
    distance_blocks: BlockTypeTracker,
    context_modes: Vec<ContextMode>,
    literal_map: Vec<u8>,
    distance_map: Vec<u8>,
    literal_trees: HuffmanTreeGroup,
    command_trees: HuffmanTreeGroup,
    distance_trees: HuffmanTreeGroup,
    distances: DistanceCodes,
}

/// Single-shot Brotli stream decoder
///
/// Drives the stream one meta-block section at a time (one command per
/// step inside a compressed meta-block) until the final meta-block.
pub struct Decoder<'a> {
    bits: BitReader<'a>,
    dictionary: Option<Dictionary<'a>>,
    allow_large_window: bool,
    /// Set when the stream header used the large-window encoding
    large_window: bool,
    ring: RingBuffer,
    max_backward_distance: usize,
    distance_ring: DistanceRing,
    /// Scratch space for transformed dictionary words
    word: Vec<u8>,
    state: State,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8], dictionary: Option<Dictionary<'a>>, allow_large_window: bool) -> Self {
        Self {
            bits: BitReader::new(input),
            dictionary,
            allow_large_window,
            large_window: false,
            ring: RingBuffer::new(0),
            max_backward_distance: 0,
            distance_ring: DistanceRing::default(),
            word: Vec::new(),
            state: State::StreamHeader,
        }
    }

    /// Decode the whole stream
    pub fn run(mut self) -> Result<Vec<u8>> {
        while self.step()? == Step::Continue {}
        self.ring.into_output()
    }

    /// Advance the state machine by one unit of work
    pub fn step(&mut self) -> Result<Step> {
        let state = std::mem::replace(&mut self.state, State::Done);
        self.state = match state {
            State::StreamHeader => {
                let window = read_window_bits(&mut self.bits, self.allow_large_window)?;
                debug!(window_bits = window.bits, large_window = window.large, "stream header");
                self.large_window = window.large;
                self.max_backward_distance = (1usize << window.bits) - WINDOW_GAP;
                self.ring = RingBuffer::new(window.bits);
                State::MetaBlockHeader
            }
            State::MetaBlockHeader => self.start_meta_block()?,
            State::Uncompressed { length, is_last } => {
                let bits = &mut self.bits;
                self.ring.write_with(length, |chunk| bits.read_aligned_bytes(chunk))?;
                self.finish_meta_block(is_last)?
            }
            State::Metadata { length, is_last } => {
                self.bits.skip_aligned_bytes(length)?;
                self.finish_meta_block(is_last)?
            }
            State::Commands(mut meta) => {
                if self.decode_command(&mut meta)? {
                    State::Commands(meta)
                } else {
                    self.finish_meta_block(meta.is_last)?
                }
            }
            State::Done => return Ok(Step::Done),
        };
        Ok(Step::Continue)
    }

    fn start_meta_block(&mut self) -> Result<State> {
        let header = MetaBlockHeader::read(&mut self.bits)?;
        debug!(is_last = header.is_last, kind = ?header.kind, length = header.length, "meta-block");

        let MetaBlockHeader { is_last, kind, length } = header;
        match kind {
            MetaBlockKind::LastEmpty => self.finish_meta_block(true),
            MetaBlockKind::Metadata => {
                self.expect_zero_padding(ErrorKind::FormatPadding1)?;
                Ok(State::Metadata { length, is_last })
            }
            MetaBlockKind::Uncompressed => {
                self.expect_zero_padding(ErrorKind::FormatPadding1)?;
                self.ring.ensure_capacity(length)?;
                Ok(State::Uncompressed { length, is_last })
            }
            MetaBlockKind::Compressed => {
                self.ring.ensure_capacity(length)?;
                let meta = self.read_compressed_header(is_last, length)?;
                Ok(State::Commands(Box::new(meta)))
            }
        }
    }

    fn finish_meta_block(&mut self, is_last: bool) -> Result<State> {
        if !is_last {
            return Ok(State::MetaBlockHeader);
        }
        self.expect_zero_padding(ErrorKind::FormatPadding2)?;
        debug!(total_out = self.ring.total_written(), consumed = self.bits.position(), "stream complete");
        Ok(State::Done)
    }

    fn expect_zero_padding(&mut self, kind: ErrorKind) -> Result<()> {
        if self.bits.align_to_byte() != 0 {
            return Err(kind.at(self.bits.position()));
        }
        Ok(())
    }

    fn read_compressed_header(&mut self, is_last: bool, length: usize) -> Result<MetaBlock> {
        let bits = &mut self.bits;
        let literal_blocks = BlockTypeTracker::decode(bits)?;
        let command_blocks = BlockTypeTracker::decode(bits)?;
        let distance_blocks = BlockTypeTracker::decode(bits)?;

        let postfix_bits = bits.read_bits(2)? as u8;
        let num_direct = (bits.read_bits(4)? as usize) << postfix_bits;

        let context_modes = read_context_modes(bits, literal_blocks.num_types())?;
        let literal_map = ContextMap::decode(bits, literal_blocks.num_types() << LITERAL_CONTEXT_BITS)?;
        let distance_map = ContextMap::decode(bits, distance_blocks.num_types() << DISTANCE_CONTEXT_BITS)?;

        let alloc = ErrorKind::AllocTreeGroups;
        let literal_trees =
            HuffmanTreeGroup::decode(bits, NUM_LITERAL_SYMBOLS, NUM_LITERAL_SYMBOLS, literal_map.num_trees, alloc)?;
        let command_trees = HuffmanTreeGroup::decode(
            bits,
            NUM_COMMAND_SYMBOLS,
            NUM_COMMAND_SYMBOLS,
            command_blocks.num_types(),
            alloc,
        )?;

        let base = NUM_DISTANCE_SHORT_CODES + num_direct;
        let (distance_max, distance_limit) = if self.large_window {
            let max = base + ((2 * MAX_LARGE_WINDOW_DISTANCE_BITS) << postfix_bits);
            (max, large_window_distance_limit(postfix_bits, num_direct))
        } else {
            let max = base + ((2 * MAX_DISTANCE_BITS) << postfix_bits);
            (max, max)
        };
        let distance_trees =
            HuffmanTreeGroup::decode(bits, distance_max, distance_limit, distance_map.num_trees, alloc)?;

        trace!(
            literal_types = literal_blocks.num_types(),
            command_types = command_blocks.num_types(),
            distance_types = distance_blocks.num_types(),
            literal_trees = literal_map.num_trees,
            distance_trees = distance_map.num_trees,
            postfix_bits,
            num_direct,
            "compressed meta-block header"
        );

        Ok(MetaBlock {
            is_last,
            remaining: length,
            literal_blocks,
            command_blocks,
            distance_blocks,
            context_modes,
            literal_map: literal_map.map,
            distance_map: distance_map.map,
            literal_trees,
            command_trees,
            distance_trees,
            distances: DistanceCodes::new(postfix_bits, num_direct, distance_limit),
        })
    }

    /// Decode and execute one insert-and-copy command
    ///
    /// Returns false once the meta-block has produced all of its bytes.
    fn decode_command(&mut self, meta: &mut MetaBlock) -> Result<bool> {
        let bits = &mut self.bits;
        let ring = &mut self.ring;

        meta.command_blocks.advance(bits)?;
        let symbol = meta.command_trees.read_symbol(meta.command_blocks.block_type(), bits)? as usize;
        let command = COMMAND_LOOKUP[symbol];
        let insert_len = command.insert_base as usize + bits.read_bits(command.insert_extra)? as usize;
        let copy_len = command.copy_base as usize + bits.read_bits(command.copy_extra)? as usize;

        if insert_len > meta.remaining {
            return Err(ErrorKind::FormatBlockLength2.at(bits.position()));
        }
        for _ in 0..insert_len {
            meta.literal_blocks.advance(bits)?;
            let block_type = meta.literal_blocks.block_type();
            let context = meta.context_modes[block_type].context(ring.last_byte(1), ring.last_byte(2));
            let tree = meta.literal_map[(block_type << LITERAL_CONTEXT_BITS) + context] as usize;
            let literal = meta.literal_trees.read_symbol(tree, bits)?;
            ring.push_byte(literal as u8)?;
        }
        meta.remaining -= insert_len;
        if meta.remaining == 0 {
            return Ok(false);
        }

        let (distance_code, distance) = if command.distance_context < 0 {
            (0, self.distance_ring.last())
        } else {
            meta.distance_blocks.advance(bits)?;
            let block_type = meta.distance_blocks.block_type();
            let tree =
                meta.distance_map[(block_type << DISTANCE_CONTEXT_BITS) + command.distance_context as usize] as usize;
            let code = meta.distance_trees.read_symbol(tree, bits)? as usize;
            let distance = if code < NUM_DISTANCE_SHORT_CODES {
                self.distance_ring.short_code(code)
            } else {
                let extra = bits.read_bits(meta.distances.extra_bits[code])? as u64;
                (meta.distances.offsets[code] + (extra << meta.distances.postfix_bits)) as i64
            };
            (code, distance)
        };
        if distance <= 0 {
            return Err(ErrorKind::FormatDistance.at(bits.position()));
        }
        let distance = distance as usize;

        let max_distance = self.max_backward_distance.min(ring.total_written());
        if distance > max_distance {
            if distance > MAX_ALLOWED_DISTANCE {
                return Err(ErrorKind::FormatDistance.at(bits.position()));
            }
            let Some(dictionary) = self.dictionary else {
                return Err(ErrorKind::DictionaryNotSet.at(bits.position()));
            };
            let size_bits = dictionary.size_bits(copy_len);
            if copy_len < MIN_WORD_LENGTH || size_bits == 0 {
                return Err(ErrorKind::FormatDictionary.at(bits.position()));
            }

            let address = distance - max_distance - 1;
            let index = address & ((1 << size_bits) - 1);
            let transform = address >> size_bits;
            let transforms = Transforms::rfc()?;
            if transform >= transforms.len() {
                return Err(ErrorKind::FormatTransform.at(bits.position()));
            }
            let word = dictionary.word(copy_len, index).ok_or_else(|| ErrorKind::FormatDictionary.at(bits.position()))?;

            self.word.clear();
            transforms.apply(&mut self.word, word, transform);
            if self.word.len() > meta.remaining {
                return Err(ErrorKind::FormatBlockLength1.at(bits.position()));
            }
            trace!(copy_len, index, transform, "dictionary reference");
            ring.write(&self.word)?;
            meta.remaining -= self.word.len();
        } else {
            if copy_len > meta.remaining {
                return Err(ErrorKind::FormatBlockLength1.at(bits.position()));
            }
            if distance_code != 0 {
                self.distance_ring.push(distance as i64);
            }
            ring.copy_backward(distance, copy_len)?;
            meta.remaining -= copy_len;
        }

        Ok(meta.remaining > 0)
    }
}
