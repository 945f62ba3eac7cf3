//! Error types for encoding and decoding.

use std::fmt;

use bytebuf::BufferError;
use thiserror::Error;

/// Why a header was rejected. Each variant is one of the checks made by
/// [`Header::validate`](crate::Header::validate), in the order they are made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("not a BAST file: expected magic {expected:?}, found {found:?}")]
    BadMagic { found: [u8; 4], expected: [u8; 4] },

    #[error("version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("format revision mismatch: found {found}, expected {expected}")]
    RevisionMismatch { found: u16, expected: u16 },

    #[error("invalid file size {size} (must be between 1 and {max})")]
    InvalidSize { size: u32, max: u32 },

    #[error("invalid {field} offset {offset} (file size {file_size})")]
    BadOffset {
        field: &'static str,
        offset: u32,
        file_size: u32,
    },

    #[error("checksum mismatch: header says {expected:#010x}, content hashes to {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

/// A single decoding failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("{table} table index {index} out of range (size {size}) at offset {offset}")]
    TableIndex {
        table: &'static str,
        index: u64,
        size: usize,
        offset: usize,
    },

    #[error("byte {tag:#04x} at offset {offset} is not a valid {category} tag")]
    TagDispatch {
        category: &'static str,
        tag: u8,
        offset: usize,
    },

    #[error("truncated input at offset {offset}: needed {needed} byte(s), {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("malformed data at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    #[error("nesting deeper than {max} levels at offset {offset}")]
    NestingTooDeep { max: usize, offset: usize },

    #[error("{count} trailing byte(s) after the root node at offset {offset}")]
    TrailingBytes { offset: usize, count: usize },
}

impl From<BufferError> for DecodeError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::Truncated {
                offset,
                needed,
                available,
            } => DecodeError::Truncated {
                offset,
                needed,
                available,
            },
            BufferError::VarintOverflow { offset } => DecodeError::Malformed {
                offset,
                reason: "varint overflow".into(),
            },
            BufferError::InvalidUtf8 { offset } => DecodeError::Malformed {
                offset,
                reason: "string is not valid UTF-8".into(),
            },
        }
    }
}

/// Every diagnostic produced by a failed decode.
///
/// Decoding stops at the first structural error, so today this holds one
/// entry; callers should still treat it as a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeErrors(pub Vec<DecodeError>);

impl DecodeErrors {
    #[must_use]
    pub fn first(&self) -> Option<&DecodeError> {
        self.0.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecodeError> {
        self.0.iter()
    }
}

impl From<DecodeError> for DecodeErrors {
    fn from(e: DecodeError) -> Self {
        DecodeErrors(vec![e])
    }
}

impl From<HeaderError> for DecodeErrors {
    fn from(e: HeaderError) -> Self {
        DecodeErrors(vec![DecodeError::Header(e)])
    }
}

impl fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeErrors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.first().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("encoded size {size} exceeds the maximum of {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("model nests deeper than {max} levels")]
    TooDeep { max: usize },
}
