//! BAST header layout, flags and format constants.
//!
//! ```text
//! offset  size  field
//!      0     4  magic "BAST"
//!      4     4  version              u32 LE
//!      8     2  flags                u16 LE
//!     10     2  format revision      u16 LE
//!     12     4  string table offset  u32 LE (always 32)
//!     16     4  root node offset     u32 LE
//!     20     4  file size            u32 LE
//!     24     4  checksum             u32 LE, Adler-32 of bytes 32..file_size
//!     28     4  reserved             zero
//! ```

use bytebuf::{ByteReader, ByteWriter};
use config::CodecConfig;

use crate::error::{DecodeError, HeaderError};

/// Magic bytes at the start of every BAST file (ASCII "BAST").
pub const MAGIC: [u8; 4] = *b"BAST";

/// Semantic version of the encoded model. Bumped whenever the meaning of the
/// node stream changes; files of any other version are rejected.
pub const VERSION: u32 = 1;

/// Internal layout revision, independent of [`VERSION`].
pub const FORMAT_REVISION: u16 = 2;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 32;

/// Largest file the codec will produce or accept (64 MiB).
pub const MAX_SIZE: usize = 64 * 1024 * 1024;

/// The string table always starts right after the header.
pub const STRING_TABLE_OFFSET: u32 = HEADER_SIZE as u32;

/// Header flag bits recording which optional data the writer kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u16);

impl Flags {
    pub const HAS_LOCATIONS: u16 = 1 << 0;
    pub const HAS_COMMENTS: u16 = 1 << 1;
    pub const HAS_DESCRIPTIONS: u16 = 1 << 2;

    #[must_use]
    pub fn from_bits(bits: u16) -> Self {
        Flags(bits)
    }

    #[must_use]
    pub fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn has_locations(self) -> bool {
        self.0 & Self::HAS_LOCATIONS != 0
    }

    #[must_use]
    pub fn has_comments(self) -> bool {
        self.0 & Self::HAS_COMMENTS != 0
    }

    #[must_use]
    pub fn has_descriptions(self) -> bool {
        self.0 & Self::HAS_DESCRIPTIONS != 0
    }
}

impl From<&CodecConfig> for Flags {
    fn from(cfg: &CodecConfig) -> Self {
        let mut bits = 0;
        if cfg.locations {
            bits |= Self::HAS_LOCATIONS;
        }
        if cfg.comments {
            bits |= Self::HAS_COMMENTS;
        }
        if cfg.descriptions {
            bits |= Self::HAS_DESCRIPTIONS;
        }
        Flags(bits)
    }
}

/// The fixed 32-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u32,
    pub flags: Flags,
    pub format_revision: u16,
    pub string_table_offset: u32,
    pub root_offset: u32,
    pub file_size: u32,
    pub checksum: u32,
}

impl Header {
    /// A header for the current version and revision.
    #[must_use]
    pub fn new(flags: Flags, root_offset: u32, file_size: u32, checksum: u32) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            flags,
            format_revision: FORMAT_REVISION,
            string_table_offset: STRING_TABLE_OFFSET,
            root_offset,
            file_size,
            checksum,
        }
    }

    pub fn write_to(&self, w: &mut ByteWriter) {
        w.write_bytes(&self.magic);
        w.write_u32(self.version);
        w.write_u16(self.flags.bits());
        w.write_u16(self.format_revision);
        w.write_u32(self.string_table_offset);
        w.write_u32(self.root_offset);
        w.write_u32(self.file_size);
        w.write_u32(self.checksum);
        w.write_u32(0);
    }

    /// Parses the raw header fields without validating them.
    ///
    /// Fails only when `bytes` is shorter than [`HEADER_SIZE`].
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < HEADER_SIZE {
            return Err(DecodeError::Truncated {
                offset: 0,
                needed: HEADER_SIZE,
                available: bytes.len(),
            });
        }
        let mut r = ByteReader::new(bytes);
        let mut magic = [0u8; 4];
        magic.copy_from_slice(r.read_bytes(4)?);
        let version = r.read_u32()?;
        let flags = Flags::from_bits(r.read_u16()?);
        let format_revision = r.read_u16()?;
        let string_table_offset = r.read_u32()?;
        let root_offset = r.read_u32()?;
        let file_size = r.read_u32()?;
        let checksum = r.read_u32()?;
        Ok(Self {
            magic,
            version,
            flags,
            format_revision,
            string_table_offset,
            root_offset,
            file_size,
            checksum,
        })
    }

    /// Checks magic, version, revision, size bounds and section offsets.
    ///
    /// Stops at the first failed check. The checksum needs the payload and is
    /// verified separately by the reader.
    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.magic != MAGIC {
            return Err(HeaderError::BadMagic {
                found: self.magic,
                expected: MAGIC,
            });
        }
        if self.version != VERSION {
            return Err(HeaderError::VersionMismatch {
                found: self.version,
                expected: VERSION,
            });
        }
        if self.format_revision != FORMAT_REVISION {
            return Err(HeaderError::RevisionMismatch {
                found: self.format_revision,
                expected: FORMAT_REVISION,
            });
        }
        if self.file_size == 0 || self.file_size as usize > MAX_SIZE {
            return Err(HeaderError::InvalidSize {
                size: self.file_size,
                max: MAX_SIZE as u32,
            });
        }
        if self.string_table_offset != STRING_TABLE_OFFSET {
            return Err(HeaderError::BadOffset {
                field: "string table",
                offset: self.string_table_offset,
                file_size: self.file_size,
            });
        }
        if self.root_offset < STRING_TABLE_OFFSET || self.root_offset >= self.file_size {
            return Err(HeaderError::BadOffset {
                field: "root",
                offset: self.root_offset,
                file_size: self.file_size,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Diagnostic for the first failed check, or `None` for a valid header.
    #[must_use]
    pub fn invalid_reason(&self) -> Option<String> {
        self.validate().err().map(|e| e.to_string())
    }
}
