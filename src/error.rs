use thiserror::Error;

/// Every way a Brotli decode can fail.
///
/// The discriminant is the stable numeric code (negative for failures, 0 for
/// the unknown/no-error slot). The `#[error]` strings are the message table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorKind {
    // Internal errors
    #[error("Unreachable code reached.")]
    Unreachable = -31,

    #[error("Unknown error occurred.")]
    Unknown = 0,

    // Allocation errors
    #[error("Failed to allocate block kind trees.")]
    AllocBlockTypeTrees = -30,

    #[error("Failed to allocate ring buffer 2.")]
    AllocRingBuffer2 = -27,

    #[error("Failed to allocate ring buffer 1.")]
    AllocRingBuffer1 = -26,

    #[error("Failed to allocate context map.")]
    AllocContextMap = -25,

    #[error("Failed to allocate tree groups.")]
    AllocTreeGroups = -22,

    #[error("Failed to allocate context modes.")]
    AllocContextModes = -21,

    // Argument errors
    #[error("Invalid arguments.")]
    InvalidArguments = -20,

    #[error("Dictionary not set.")]
    DictionaryNotSet = -19,

    // Bitstream format errors
    #[error("Invalid distance found.")]
    FormatDistance = -16,

    #[error("Invalid padding bits found in the last metablock.")]
    FormatPadding2 = -15,

    #[error("Invalid padding bits found.")]
    FormatPadding1 = -14,

    #[error("Invalid window size found.")]
    FormatWindowBits = -13,

    #[error("Invalid dictionary size or distance found.")]
    FormatDictionary = -12,

    #[error("Reserved transform found.")]
    FormatTransform = -11,

    #[error("Block length is too long.")]
    FormatBlockLength2 = -10,

    #[error("Block length is too short.")]
    FormatBlockLength1 = -9,

    #[error("Context map repeat is too long.")]
    FormatContextMapRepeat = -8,

    #[error("Distance code is too far back for the huffman code.")]
    FormatHuffmanSpace = -7,

    #[error("Distance code is too far back.")]
    FormatClSpace = -6,

    #[error("Duplicate simple Huffman symbols.")]
    FormatSimpleHuffmanSame = -5,

    #[error("Simple Huffman code alphabet error.")]
    FormatSimpleHuffmanAlphabet = -4,

    #[error("Invalid meta-block nibble.")]
    FormatExuberantMetaNibble = -3,

    #[error("Reserved format error.")]
    FormatReserved = -2,

    #[error("Invalid nibble.")]
    FormatExuberantNibble = -1,
}

const ALL_KINDS: [ErrorKind; 26] = [
    ErrorKind::Unreachable,
    ErrorKind::Unknown,
    ErrorKind::AllocBlockTypeTrees,
    ErrorKind::AllocRingBuffer2,
    ErrorKind::AllocRingBuffer1,
    ErrorKind::AllocContextMap,
    ErrorKind::AllocTreeGroups,
    ErrorKind::AllocContextModes,
    ErrorKind::InvalidArguments,
    ErrorKind::DictionaryNotSet,
    ErrorKind::FormatDistance,
    ErrorKind::FormatPadding2,
    ErrorKind::FormatPadding1,
    ErrorKind::FormatWindowBits,
    ErrorKind::FormatDictionary,
    ErrorKind::FormatTransform,
    ErrorKind::FormatBlockLength2,
    ErrorKind::FormatBlockLength1,
    ErrorKind::FormatContextMapRepeat,
    ErrorKind::FormatHuffmanSpace,
    ErrorKind::FormatClSpace,
    ErrorKind::FormatSimpleHuffmanSame,
    ErrorKind::FormatSimpleHuffmanAlphabet,
    ErrorKind::FormatExuberantMetaNibble,
    ErrorKind::FormatReserved,
    ErrorKind::FormatExuberantNibble,
];

impl ErrorKind {
    /// Stable numeric code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look up a kind by its numeric code
    pub fn from_code(code: i32) -> Option<Self> {
        ALL_KINDS.iter().copied().find(|k| k.code() == code)
    }

    /// Upper-snake symbolic name, e.g. `FORMAT_DISTANCE`
    pub fn name(self) -> &'static str {
        match self {
            Self::Unreachable => "UNREACHABLE",
            Self::Unknown => "UNKNOWN",
            Self::AllocBlockTypeTrees => "ALLOC_BLOCK_TYPE_TREES",
            Self::AllocRingBuffer2 => "ALLOC_RING_BUFFER_2",
            Self::AllocRingBuffer1 => "ALLOC_RING_BUFFER_1",
            Self::AllocContextMap => "ALLOC_CONTEXT_MAP",
            Self::AllocTreeGroups => "ALLOC_TREE_GROUPS",
            Self::AllocContextModes => "ALLOC_CONTEXT_MODES",
            Self::InvalidArguments => "INVALID_ARGUMENTS",
            Self::DictionaryNotSet => "DICTIONARY_NOT_SET",
            Self::FormatDistance => "FORMAT_DISTANCE",
            Self::FormatPadding2 => "FORMAT_PADDING_2",
            Self::FormatPadding1 => "FORMAT_PADDING_1",
            Self::FormatWindowBits => "FORMAT_WINDOW_BITS",
            Self::FormatDictionary => "FORMAT_DICTIONARY",
            Self::FormatTransform => "FORMAT_TRANSFORM",
            Self::FormatBlockLength2 => "FORMAT_BLOCK_LENGTH_2",
            Self::FormatBlockLength1 => "FORMAT_BLOCK_LENGTH_1",
            Self::FormatContextMapRepeat => "FORMAT_CONTEXT_MAP_REPEAT",
            Self::FormatHuffmanSpace => "FORMAT_HUFFMAN_SPACE",
            Self::FormatClSpace => "FORMAT_CL_SPACE",
            Self::FormatSimpleHuffmanSame => "FORMAT_SIMPLE_HUFFMAN_SAME",
            Self::FormatSimpleHuffmanAlphabet => "FORMAT_SIMPLE_HUFFMAN_ALPHABET",
            Self::FormatExuberantMetaNibble => "FORMAT_EXUBERANT_META_NIBBLE",
            Self::FormatReserved => "FORMAT_RESERVED",
            Self::FormatExuberantNibble => "FORMAT_EXUBERANT_NIBBLE",
        }
    }

    /// Whether the kind is a direct bitstream violation
    pub fn is_format(self) -> bool {
        (-16..=-1).contains(&self.code())
    }

    /// Attach the input byte offset at which the failure was detected
    pub fn at(self, offset: usize) -> Error {
        Error { kind: self, offset }
    }
}

/// A decode failure: the kind plus the input byte offset where it surfaced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("BROTLI_DECODER_ERROR_{}: {kind} (input offset {offset})", .kind.name())]
pub struct Error {
    kind: ErrorKind,
    offset: usize,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Human-readable message for the kind (without the offset)
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Input byte offset (0 for failures not tied to the stream)
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        kind.at(0)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorKind::Unknown.code(), 0);
        assert_eq!(ErrorKind::FormatExuberantNibble.code(), -1);
        assert_eq!(ErrorKind::FormatDistance.code(), -16);
        assert_eq!(ErrorKind::DictionaryNotSet.code(), -19);
        assert_eq!(ErrorKind::InvalidArguments.code(), -20);
        assert_eq!(ErrorKind::AllocRingBuffer1.code(), -26);
        assert_eq!(ErrorKind::Unreachable.code(), -31);
    }

    #[test]
    fn test_from_code_roundtrip() {
        for kind in ALL_KINDS {
            assert_eq!(ErrorKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ErrorKind::from_code(-17), None);
        assert_eq!(ErrorKind::from_code(5), None);
    }

    #[test]
    fn test_format_class() {
        assert!(ErrorKind::FormatPadding2.is_format());
        assert!(ErrorKind::FormatExuberantNibble.is_format());
        assert!(!ErrorKind::DictionaryNotSet.is_format());
        assert!(!ErrorKind::AllocTreeGroups.is_format());
    }

    #[test]
    fn test_display() {
        let err = ErrorKind::FormatWindowBits.at(3);
        assert_eq!(err.code(), -13);
        assert_eq!(err.name(), "FORMAT_WINDOW_BITS");
        assert_eq!(err.message(), "Invalid window size found.");
        assert_eq!(
            err.to_string(),
            "BROTLI_DECODER_ERROR_FORMAT_WINDOW_BITS: Invalid window size found. (input offset 3)"
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ErrorKind::FormatPadding2.to_string(), "Invalid padding bits found in the last metablock.");
        assert_eq!(ErrorKind::FormatDictionary.to_string(), "Invalid dictionary size or distance found.");
        assert_eq!(ErrorKind::AllocBlockTypeTrees.to_string(), "Failed to allocate block kind trees.");
        assert_eq!(ErrorKind::FormatExuberantNibble.to_string(), "Invalid nibble.");
    }
}
