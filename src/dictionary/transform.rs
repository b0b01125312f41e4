use crate::error::{ErrorKind, Result};
use std::sync::OnceLock;

/// Number of transforms in the RFC 7932 set
pub const NUM_TRANSFORMS: usize = 121;

/// RFC affixes, each terminated by `#`
const RFC_AFFIX_POOL: &[u8] = b"# #s #, #e #.# the #.com/#\xc2\xa0# of # and # in # to #\"#\">#\n#]# for # a # that #. # with #'# from # by #. The # on # as # is #ing #\n\t#:#ed #(# at #ly #=\"# of the #. This #,# not #er #al #='#ful #ive #less #est #ize #ous #";
const RFC_AFFIX_STORAGE: usize = 167;
const RFC_AFFIX_COUNT: usize = 50;

/// (prefix, op, suffix) for each RFC transform
const RFC_TRIPLETS: [[u8; 3]; NUM_TRANSFORMS] = [
    [0, 0, 0], [0, 0, 1], [1, 0, 1], [0, 12, 0], [0, 10, 1], [0, 0, 6], [1, 0, 0], [2, 0, 1],
    [0, 0, 9], [0, 10, 0], [0, 0, 10], [0, 13, 0], [0, 1, 0], [3, 0, 1], [0, 0, 3], [1, 10, 1],
    [0, 0, 11], [0, 0, 12], [4, 0, 1], [0, 0, 13], [0, 0, 5], [0, 0, 14], [0, 0, 15], [0, 3, 0],
    [0, 0, 16], [0, 0, 17], [0, 14, 0], [0, 2, 0], [0, 0, 18], [0, 0, 19], [1, 10, 0], [0, 0, 20],
    [5, 0, 0], [1, 0, 3], [0, 15, 0], [0, 0, 21], [0, 0, 22], [0, 0, 23], [0, 0, 24], [0, 16, 0],
    [0, 17, 0], [6, 0, 0], [0, 4, 0], [0, 0, 25], [0, 11, 0], [0, 0, 26], [0, 0, 27], [0, 0, 28],
    [0, 7, 0], [0, 1, 29], [0, 0, 30], [0, 0, 31], [1, 0, 20], [0, 0, 32], [0, 20, 0], [0, 18, 0],
    [0, 6, 0], [0, 0, 33], [0, 10, 3], [0, 8, 0], [0, 0, 34], [0, 0, 35], [6, 0, 9], [0, 5, 0],
    [0, 9, 0], [1, 10, 3], [0, 10, 13], [5, 0, 33], [0, 11, 1], [0, 10, 14], [0, 0, 36], [1, 0, 5],
    [7, 0, 0], [6, 0, 37], [0, 10, 22], [0, 0, 38], [0, 0, 39], [5, 0, 1], [0, 10, 33], [0, 10, 5],
    [0, 0, 40], [1, 0, 36], [0, 0, 41], [1, 11, 1], [0, 0, 42], [1, 11, 0], [0, 0, 43], [0, 11, 13],
    [0, 10, 20], [1, 0, 33], [0, 0, 44], [1, 10, 20], [0, 0, 45], [0, 0, 46], [0, 11, 22], [0, 0, 47],
    [1, 10, 5], [0, 11, 14], [1, 0, 43], [0, 10, 39], [0, 0, 48], [0, 11, 5], [8, 0, 0], [1, 0, 39],
    [0, 10, 36], [0, 11, 36], [0, 0, 49], [0, 11, 3], [0, 10, 43], [1, 10, 39], [1, 11, 36], [1, 11, 3],
    [0, 11, 39], [0, 11, 33], [0, 11, 20], [1, 11, 5], [0, 11, 43], [1, 11, 20], [1, 10, 36], [1, 11, 43],
    [1, 10, 43],
];

/// Transform op codes
pub const OP_UPPERCASE_FIRST: u8 = 10;
pub const OP_UPPERCASE_ALL: u8 = 11;
pub const OP_SHIFT_FIRST: u8 = 21;
pub const OP_SHIFT_ALL: u8 = 22;

/// Unpacked word transform table
#[derive(Debug, Clone)]
pub struct Transforms {
    storage: Vec<u8>,
    /// Affix `i` is `storage[heads[i]..heads[i + 1]]`
    heads: Vec<usize>,
    triplets: Vec<[u8; 3]>,
    params: Vec<u16>,
}

impl Transforms {
    /// Unpack a transform table
    ///
    /// `pool` holds `affix_count` affixes of `storage_len` total bytes, each
    /// followed by `#`. `params` may be empty (all zero).
    pub fn unpack(
        num_transforms: usize,
        pool: &[u8],
        storage_len: usize,
        affix_count: usize,
        triplets: &[[u8; 3]],
        params: &[u16],
    ) -> Result<Self> {
        if pool.len() != storage_len + affix_count {
            return Err(ErrorKind::FormatTransform.into());
        }

        let mut storage = Vec::with_capacity(storage_len);
        let mut heads = Vec::with_capacity(affix_count + 1);
        heads.push(0);
        for &c in pool {
            if c == b'#' {
                heads.push(storage.len());
            } else {
                storage.push(c);
            }
        }
        if heads.len() != affix_count + 1 {
            return Err(ErrorKind::FormatTransform.into());
        }

        if triplets.len() != num_transforms {
            return Err(ErrorKind::FormatTransform.into());
        }
        let valid = |t: &[u8; 3]| {
            (t[0] as usize) < affix_count && (t[2] as usize) < affix_count && t[1] <= OP_SHIFT_ALL
        };
        if !triplets.iter().all(valid) {
            return Err(ErrorKind::FormatTransform.into());
        }

        let params = match params.len() {
            0 => vec![0; num_transforms],
            n if n == num_transforms => params.to_vec(),
            _ => return Err(ErrorKind::FormatTransform.into()),
        };

        Ok(Self { storage, heads, triplets: triplets.to_vec(), params })
    }

    /// The RFC 7932 Appendix B set, unpacked once per process
    pub fn rfc() -> Result<&'static Transforms> {
        static RFC: OnceLock<Result<Transforms>> = OnceLock::new();
        RFC.get_or_init(|| {
            Transforms::unpack(NUM_TRANSFORMS, RFC_AFFIX_POOL, RFC_AFFIX_STORAGE, RFC_AFFIX_COUNT, &RFC_TRIPLETS, &[])
        })
        .as_ref()
        .map_err(Clone::clone)
    }

    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    fn affix(&self, idx: u8) -> &[u8] {
        let idx = idx as usize;
        &self.storage[self.heads[idx]..self.heads[idx + 1]]
    }

    /// Append `word` under transform `index` to `dst`
    pub fn apply(&self, dst: &mut Vec<u8>, word: &[u8], index: usize) {
        let [prefix, op, suffix] = self.triplets[index];

        let omit_first = if (12..=20).contains(&op) { (op - 11) as usize } else { 0 };
        let omit_last = if (1..=9).contains(&op) { op as usize } else { 0 };

        dst.extend_from_slice(self.affix(prefix));

        let start = dst.len();
        let kept = word.len().saturating_sub(omit_first + omit_last);
        let first = omit_first.min(word.len());
        dst.extend_from_slice(&word[first..first + kept]);

        match op {
            OP_UPPERCASE_FIRST | OP_UPPERCASE_ALL => uppercase(&mut dst[start..], op == OP_UPPERCASE_FIRST),
            OP_SHIFT_FIRST | OP_SHIFT_ALL => shift(&mut dst[start..], self.params[index], op == OP_SHIFT_FIRST),
            _ => {}
        }

        dst.extend_from_slice(self.affix(suffix));
    }
}

/// Uppercase ASCII letters and fold the case bit of 2- and 3-byte UTF-8 sequences
fn uppercase(word: &mut [u8], first_only: bool) {
    let mut i = 0;
    while i < word.len() {
        let c0 = word[i];
        let step = if c0 < 0xC0 {
            if c0.is_ascii_lowercase() {
                word[i] ^= 32;
            }
            1
        } else if c0 < 0xE0 {
            if let Some(c1) = word.get_mut(i + 1) {
                *c1 ^= 32;
            }
            2
        } else {
            if let Some(c2) = word.get_mut(i + 2) {
                *c2 ^= 5;
            }
            3
        };
        if first_only {
            break;
        }
        i += step;
    }
}

/// Add a signed offset to each UTF-8 scalar, keeping its encoded width
fn shift(word: &mut [u8], param: u16, first_only: bool) {
    let base = (param as u32 & 0x7FFF).wrapping_add(0x0100_0000 - (param as u32 & 0x8000));
    let mut i = 0;
    while i < word.len() {
        let rest = word.len() - i;
        let c0 = word[i] as u32;
        let step = if c0 < 0x80 {
            let scalar = base.wrapping_add(c0);
            word[i] = (scalar & 0x7F) as u8;
            1
        } else if c0 < 0xC0 {
            // Continuation byte: skip
            1
        } else if c0 < 0xE0 {
            if rest < 2 {
                rest
            } else {
                let c1 = word[i + 1] as u32;
                let scalar = base.wrapping_add((c1 & 0x3F) | ((c0 & 0x1F) << 6));
                word[i] = (0xC0 | ((scalar >> 6) & 0x1F)) as u8;
                word[i + 1] = ((c1 & 0xC0) | (scalar & 0x3F)) as u8;
                2
            }
        } else if c0 < 0xF0 {
            if rest < 3 {
                rest
            } else {
                let c1 = word[i + 1] as u32;
                let c2 = word[i + 2] as u32;
                let scalar = base.wrapping_add((c2 & 0x3F) | ((c1 & 0x3F) << 6) | ((c0 & 0x0F) << 12));
                word[i] = (0xE0 | ((scalar >> 12) & 0x0F)) as u8;
                word[i + 1] = ((c1 & 0xC0) | ((scalar >> 6) & 0x3F)) as u8;
                word[i + 2] = ((c2 & 0xC0) | (scalar & 0x3F)) as u8;
                3
            }
        } else if c0 < 0xF8 {
            if rest < 4 {
                rest
            } else {
                let c1 = word[i + 1] as u32;
                let c2 = word[i + 2] as u32;
                let c3 = word[i + 3] as u32;
                let scalar = base.wrapping_add(
                    (c3 & 0x3F) | ((c2 & 0x3F) << 6) | ((c1 & 0x3F) << 12) | ((c0 & 0x07) << 18),
                );
                word[i] = (0xF0 | ((scalar >> 18) & 0x07)) as u8;
                word[i + 1] = ((c1 & 0xC0) | ((scalar >> 12) & 0x3F)) as u8;
                word[i + 2] = ((c2 & 0xC0) | ((scalar >> 6) & 0x3F)) as u8;
                word[i + 3] = ((c3 & 0xC0) | (scalar & 0x3F)) as u8;
                4
            }
        } else {
            1
        };
        if first_only {
            break;
        }
        i += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(index: usize, word: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        Transforms::rfc().unwrap().apply(&mut out, word, index);
        out
    }

    #[test]
    fn test_rfc_table_unpacks() {
        let t = Transforms::rfc().unwrap();
        assert_eq!(t.len(), NUM_TRANSFORMS);
        assert_eq!(t.affix(0), b"");
        assert_eq!(t.affix(6), b" the ");
        assert_eq!(t.affix(49), b"ous ");
    }

    #[test]
    fn test_identity_and_affixes() {
        assert_eq!(apply(0, b"time"), b"time");
        assert_eq!(apply(1, b"time"), b"time ");
        assert_eq!(apply(2, b"time"), b" time ");
        assert_eq!(apply(5, b"time"), b"time the ");
        assert_eq!(apply(73, b"time"), b" the time of the ");
    }

    #[test]
    fn test_omit_first_and_last() {
        // 3: omit first 1, 12: omit last 1, 49: omit last 1 + "ing "
        assert_eq!(apply(3, b"time"), b"ime");
        assert_eq!(apply(12, b"time"), b"tim");
        assert_eq!(apply(49, b"time"), b"timing ");
        // Omitting more than the word leaves nothing
        assert_eq!(apply(54, b"time"), b"");
    }

    #[test]
    fn test_uppercase() {
        assert_eq!(apply(9, b"time"), b"Time");
        assert_eq!(apply(44, b"time"), b"TIME");
        assert_eq!(apply(4, b"time"), b"Time ");
        // Two-byte sequence: bit 5 of the continuation byte flips
        assert_eq!(apply(44, "é".as_bytes()), "É".as_bytes());
        // Only the first codepoint for uppercase-first
        assert_eq!(apply(9, "éé".as_bytes()), "Éé".as_bytes());
    }

    #[test]
    fn test_uppercase_truncated_sequence() {
        // A lead byte at the very end does not touch bytes past the word
        let mut word = vec![b'a', 0xE3];
        uppercase(&mut word, false);
        assert_eq!(word, vec![b'A', 0xE3]);
    }

    #[test]
    fn test_shift() {
        let mut word = b"abc".to_vec();
        shift(&mut word, 1, false);
        assert_eq!(word, b"bcd");

        let mut word = b"abc".to_vec();
        shift(&mut word, 1, true);
        assert_eq!(word, b"bbc");

        // Negative offsets: 0xFFFF is -1
        let mut word = "é".as_bytes().to_vec();
        shift(&mut word, 0xFFFF, false);
        assert_eq!(word, "è".as_bytes());
    }

    #[test]
    fn test_unpack_rejects_bad_pool_length() {
        let err = Transforms::unpack(1, b"a#b#", 2, 3, &[[0, 0, 0]], &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatTransform);
    }

    #[test]
    fn test_unpack_rejects_bad_triplets() {
        let err = Transforms::unpack(2, b"a#b#", 2, 2, &[[0, 0, 1]], &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatTransform);

        let err = Transforms::unpack(1, b"a#b#", 2, 2, &[[0, 0, 2]], &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatTransform);
    }

    #[test]
    fn test_custom_table() {
        let t = Transforms::unpack(2, b"<#>#", 2, 2, &[[0, 0, 1], [1, 11, 0]], &[]).unwrap();
        let mut out = Vec::new();
        t.apply(&mut out, b"tag", 0);
        t.apply(&mut out, b"tag", 1);
        assert_eq!(out, b"<tag>>TAG<");
    }
}
