use super::tables::MAX_CODE_LENGTH;

/// Pack a table entry: code bits in the high half, symbol (or subtable
/// offset) in the low half
#[inline]
pub(crate) const fn entry(bits: u32, value: u32) -> u32 {
    (bits << 16) | value
}

/// Advance `key` to the next code of length `len` in bit-reversed order
#[inline]
fn next_key(key: u32, len: usize) -> u32 {
    let mut step = 1u32 << (len - 1);
    while key & step != 0 {
        step >>= 1;
    }
    (key & step.wrapping_sub(1)) + step
}

/// Store `item` at `table[base + end - step]`, `table[base + end - 2*step]`, ... down to `base`
#[inline]
fn replicate_value(table: &mut [u32], base: usize, step: usize, end: usize, item: u32) {
    let mut pos = end;
    loop {
        pos -= step;
        table[base + pos] = item;
        if pos == 0 {
            break;
        }
    }
}

/// Width of the subtable needed for codes starting at length `len`
fn next_table_bit_size(count: &[u32; MAX_CODE_LENGTH + 1], mut len: usize, root_bits: usize) -> usize {
    let mut left = 1i32 << (len - root_bits);
    while len < MAX_CODE_LENGTH {
        left -= count[len] as i32;
        if left <= 0 {
            break;
        }
        len += 1;
        left <<= 1;
    }
    len - root_bits
}

/// Build a two-level decode table from per-symbol code lengths
///
/// The root table has `1 << root_bits` slots indexed by the next
/// `root_bits` input bits. Codes longer than the root spill into
/// subtables appended after the root; the root slot then holds
/// `entry(sub_bits + root_bits, offset_to_subtable)`.
///
/// The lengths must describe a complete prefix code (or a single symbol,
/// which decodes with zero bits). Returns the number of slots written.
pub fn build_table(table: &mut [u32], root_bits: u8, code_lengths: &[u8]) -> usize {
    let root_bits = root_bits as usize;
    let mut count = [0u32; MAX_CODE_LENGTH + 1];
    let mut offset = [0usize; MAX_CODE_LENGTH + 1];

    for &len in code_lengths {
        count[len as usize] += 1;
    }
    for len in 1..MAX_CODE_LENGTH {
        offset[len + 1] = offset[len] + count[len] as usize;
    }

    // Symbols sorted by code length, then by value
    let mut sorted = vec![0u32; code_lengths.len()];
    for (symbol, &len) in code_lengths.iter().enumerate() {
        if len != 0 {
            sorted[offset[len as usize]] = symbol as u32;
            offset[len as usize] += 1;
        }
    }

    let mut table_size = 1usize << root_bits;
    let mut total_size = table_size;

    // Single symbol: every input decodes to it without consuming bits
    if offset[MAX_CODE_LENGTH] == 1 {
        table[..total_size].fill(entry(0, sorted[0]));
        return total_size;
    }

    let mut key = 0u32;
    let mut symbol = 0usize;
    let mut step = 1usize;
    for len in 1..=root_bits {
        step <<= 1;
        while count[len] > 0 {
            replicate_value(table, key as usize, step, table_size, entry(len as u32, sorted[symbol]));
            symbol += 1;
            key = next_key(key, len);
            count[len] -= 1;
        }
    }

    let mask = total_size - 1;
    let mut low = usize::MAX;
    let mut current_offset = 0usize;
    step = 1;
    for len in root_bits + 1..=MAX_CODE_LENGTH {
        step <<= 1;
        while count[len] > 0 {
            if (key as usize & mask) != low {
                current_offset += table_size;
                let table_bits = next_table_bit_size(&count, len, root_bits);
                table_size = 1 << table_bits;
                total_size += table_size;
                low = key as usize & mask;
                table[low] = entry((table_bits + root_bits) as u32, (current_offset - low) as u32);
            }
            replicate_value(
                table,
                current_offset + (key as usize >> root_bits),
                step,
                table_size,
                entry((len - root_bits) as u32, sorted[symbol]),
            );
            symbol += 1;
            key = next_key(key, len);
            count[len] -= 1;
        }
    }

    total_size
}
