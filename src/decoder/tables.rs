pub const NUM_LITERAL_SYMBOLS: usize = 256;
pub const NUM_COMMAND_SYMBOLS: usize = 704;
pub const NUM_BLOCK_LENGTH_SYMBOLS: usize = 26;
pub const NUM_DISTANCE_SHORT_CODES: usize = 16;

pub const LITERAL_CONTEXT_BITS: usize = 6;
pub const DISTANCE_CONTEXT_BITS: usize = 2;

/// Extra-bit limit of distance codes in a regular stream
pub const MAX_DISTANCE_BITS: usize = 24;
/// Extra-bit limit of distance codes in a large-window stream
pub const MAX_LARGE_WINDOW_DISTANCE_BITS: usize = 62;
/// Largest distance a large-window stream may encode
pub const MAX_ALLOWED_DISTANCE: usize = 0x7FFF_FFFC;

/// Bytes of the window unavailable to backward references
pub const WINDOW_GAP: usize = 16;

/// Block count codes 0-25: base length and extra bits
pub const BLOCK_LENGTH_TABLE: [(u32, u8); NUM_BLOCK_LENGTH_SYMBOLS] = [
    // (base_length, extra_bits)
    (1, 2),
    (5, 2),
    (9, 2),
    (13, 2),
    (17, 3),
    (25, 3),
    (33, 3),
    (41, 3),
    (49, 4),
    (65, 4),
    (81, 4),
    (97, 4),
    (113, 5),
    (145, 5),
    (177, 5),
    (209, 5),
    (241, 6),
    (305, 6),
    (369, 7),
    (497, 8),
    (753, 9),
    (1265, 10),
    (2289, 11),
    (4337, 12),
    (8433, 13),
    (16625, 24),
];

/// Insert length codes 0-23: base length and extra bits
pub const INSERT_LENGTH_TABLE: [(u32, u8); 24] = [
    // (base_length, extra_bits)
    (0, 0),
    (1, 0),
    (2, 0),
    (3, 0),
    (4, 0),
    (5, 0),
    (6, 1),
    (8, 1),
    (10, 2),
    (14, 2),
    (18, 3),
    (26, 3),
    (34, 4),
    (50, 4),
    (66, 5),
    (98, 5),
    (130, 6),
    (194, 7),
    (322, 8),
    (578, 9),
    (1090, 10),
    (2114, 12),
    (6210, 14),
    (22594, 24),
];

/// Copy length codes 0-23: base length and extra bits
pub const COPY_LENGTH_TABLE: [(u32, u8); 24] = [
    // (base_length, extra_bits)
    (2, 0),
    (3, 0),
    (4, 0),
    (5, 0),
    (6, 0),
    (7, 0),
    (8, 0),
    (9, 0),
    (10, 1),
    (12, 1),
    (14, 2),
    (18, 2),
    (22, 3),
    (30, 3),
    (38, 4),
    (54, 4),
    (70, 5),
    (102, 5),
    (134, 6),
    (198, 7),
    (326, 8),
    (582, 9),
    (1094, 10),
    (2118, 24),
];

/// An insert-and-copy command symbol split into its parts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandCode {
    pub insert_base: u32,
    pub insert_extra: u8,
    pub copy_base: u32,
    pub copy_extra: u8,
    /// Distance context 0-3, or negative when the command reuses the last distance
    pub distance_context: i8,
}

const fn build_command_lookup() -> [CommandCode; NUM_COMMAND_SYMBOLS] {
    let mut table = [CommandCode { insert_base: 0, insert_extra: 0, copy_base: 0, copy_extra: 0, distance_context: 0 };
        NUM_COMMAND_SYMBOLS];
    let mut cmd = 0;
    while cmd < NUM_COMMAND_SYMBOLS {
        let mut range = cmd >> 6;
        let mut context_offset = -4i8;
        if range >= 2 {
            range -= 2;
            context_offset = 0;
        }
        // 2-bit insert/copy range selectors for each 64-symbol block
        let insert_code = (((0x29850 >> (range * 2)) & 3) << 3) | ((cmd >> 3) & 7);
        let copy_code = (((0x26244 >> (range * 2)) & 3) << 3) | (cmd & 7);
        let (insert_base, insert_extra) = INSERT_LENGTH_TABLE[insert_code];
        let (copy_base, copy_extra) = COPY_LENGTH_TABLE[copy_code];
        let copy_context = if copy_base > 4 { 3 } else { copy_base as i8 - 2 };

        table[cmd] = CommandCode {
            insert_base,
            insert_extra,
            copy_base,
            copy_extra,
            distance_context: context_offset + copy_context,
        };
        cmd += 1;
    }
    table
}

pub static COMMAND_LOOKUP: [CommandCode; NUM_COMMAND_SYMBOLS] = build_command_lookup();

/// UTF-8 context: contribution of the previous byte
const UTF8_LUT0: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 4, 4, 0, 0, 4, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    8, 12, 16, 12, 12, 20, 12, 16, 24, 28, 12, 12, 32, 12, 36, 12, //
    44, 44, 44, 44, 44, 44, 44, 44, 44, 44, 32, 32, 24, 40, 28, 12, //
    12, 48, 52, 52, 52, 48, 52, 52, 52, 48, 52, 52, 52, 52, 52, 48, //
    52, 52, 52, 52, 52, 48, 52, 52, 52, 52, 52, 24, 12, 28, 12, 12, //
    12, 56, 60, 60, 60, 56, 60, 60, 60, 56, 60, 60, 60, 60, 60, 56, //
    60, 60, 60, 60, 60, 56, 60, 60, 60, 60, 60, 24, 12, 28, 12, 0, //
    0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, //
    0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, //
    0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, //
    0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, //
    2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, //
    2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, //
    2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, //
    2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, //
];

/// UTF-8 context: contribution of the byte before the previous one, as (run, value)
const UTF8_LUT1_RUNS: [(usize, u8); 10] =
    [(33, 0), (15, 1), (10, 2), (7, 1), (26, 2), (6, 1), (26, 3), (4, 1), (97, 0), (32, 2)];

/// Signed context: 3-bit bucket of a byte read as a signed value, as (run, value)
const SIGNED_LUT_RUNS: [(usize, u8); 8] = [(1, 0), (15, 1), (48, 2), (64, 3), (64, 4), (48, 5), (15, 6), (1, 7)];

const fn expand_runs<const N: usize>(runs: [(usize, u8); N]) -> [u8; 256] {
    let mut out = [0u8; 256];
    let mut pos = 0;
    let mut r = 0;
    while r < N {
        let (count, value) = runs[r];
        let mut i = 0;
        while i < count {
            out[pos] = value;
            pos += 1;
            i += 1;
        }
        r += 1;
    }
    out
}

/// Literal context lookup: mode `m` uses `[m * 512 + p1] | [m * 512 + 256 + p2]`
const fn build_context_lookup() -> [u8; 2048] {
    let utf8_lut1 = expand_runs(UTF8_LUT1_RUNS);
    let signed_lut = expand_runs(SIGNED_LUT_RUNS);

    let mut table = [0u8; 2048];
    let mut i = 0;
    while i < 256 {
        // LSB6 and MSB6 ignore the second byte
        table[i] = (i & 0x3F) as u8;
        table[512 + i] = (i >> 2) as u8;
        table[1024 + i] = UTF8_LUT0[i];
        table[1024 + 256 + i] = utf8_lut1[i];
        table[1536 + i] = signed_lut[i] << 3;
        table[1536 + 256 + i] = signed_lut[i];
        i += 1;
    }
    table
}

pub static CONTEXT_LOOKUP: [u8; 2048] = build_context_lookup();

/// Distance short codes 0-15: which of the last four distances (0 = most
/// recent, counting back modulo 4) and the delta to add
pub const DISTANCE_SHORT_CODE_INDEX_OFFSET: [usize; NUM_DISTANCE_SHORT_CODES] =
    [0, 3, 2, 1, 0, 0, 0, 0, 0, 0, 3, 3, 3, 3, 3, 3];
pub const DISTANCE_SHORT_CODE_VALUE_OFFSET: [i32; NUM_DISTANCE_SHORT_CODES] =
    [0, 0, 0, 0, -1, 1, -2, 2, -3, 3, -1, 1, -2, 2, -3, 3];
