//! # ByteBuf - bounds-checked byte sink and source
//!
//! The two primitives every BAST section is built from:
//!
//! - [`ByteWriter`]: append-only growable sink. Writes are infallible; the
//!   finished bytes are taken with [`ByteWriter::into_bytes`].
//! - [`ByteReader`]: cursor over a borrowed byte slice. Every read checks the
//!   cursor against the slice length and returns a [`BufferError`] instead of
//!   panicking on malformed or partial input.
//!
//! ## Primitive encodings
//!
//! ```text
//! u8            1 byte
//! u16 / u32     2 / 4 bytes, little-endian
//! varint        LEB128 (1..=10 bytes)
//! zigzag        zigzag(i64) as LEB128
//! string        varint byte_len | UTF-8 bytes
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bytebuf::{ByteReader, ByteWriter};
//!
//! let mut w = ByteWriter::new();
//! w.write_u32(7);
//! w.write_varint(300);
//! w.write_zigzag(-2);
//! w.write_str("entity");
//! let bytes = w.into_bytes();
//!
//! let mut r = ByteReader::new(&bytes);
//! assert_eq!(r.read_u32().unwrap(), 7);
//! assert_eq!(r.read_varint().unwrap(), 300);
//! assert_eq!(r.read_zigzag().unwrap(), -2);
//! assert_eq!(r.read_string().unwrap(), "entity");
//! assert!(r.is_at_end());
//! ```

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;
use varint::MAX_VARINT_BYTES;

/// Errors raised while reading from a [`ByteReader`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The read would run past the end of the buffer.
    #[error("truncated input at offset {offset}: needed {needed} byte(s), {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A varint was longer than 10 bytes or overflowed its target width.
    #[error("malformed varint at offset {offset}")]
    VarintOverflow { offset: usize },

    /// A length-prefixed string did not contain valid UTF-8.
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },
}

/// Append-only byte sink.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Current length, i.e. the offset the next write lands at.
    #[must_use]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        let mut tmp = [0u8; 2];
        LittleEndian::write_u16(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn write_u32(&mut self, v: u32) {
        let mut tmp = [0u8; 4];
        LittleEndian::write_u32(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    /// Writes `v` as LEB128 and returns the number of bytes used.
    pub fn write_varint(&mut self, v: u64) -> usize {
        varint::encode_u64(v, &mut self.buf)
    }

    /// Writes `v` zigzag-mapped, then LEB128.
    pub fn write_zigzag(&mut self, v: i64) -> usize {
        varint::encode_i64(v, &mut self.buf)
    }

    /// Writes `varint byte_len` followed by the UTF-8 bytes of `s`.
    pub fn write_str(&mut self, s: &str) {
        self.write_varint(s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Consumes the writer and returns the written bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current cursor offset from the start of the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left between the cursor and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Moves the cursor to the absolute offset `pos`.
    ///
    /// Seeking to exactly `len()` is allowed; anything beyond is an error.
    pub fn seek(&mut self, pos: usize) -> Result<(), BufferError> {
        if pos > self.buf.len() {
            return Err(BufferError::Truncated {
                offset: pos,
                needed: 0,
                available: 0,
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Returns the next `n` bytes and advances past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], BufferError> {
        let available = self.remaining();
        if n > available {
            return Err(BufferError::Truncated {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8, BufferError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Returns the next byte without advancing.
    pub fn peek_u8(&self) -> Result<u8, BufferError> {
        self.buf.get(self.pos).copied().ok_or(BufferError::Truncated {
            offset: self.pos,
            needed: 1,
            available: 0,
        })
    }

    pub fn read_u16(&mut self) -> Result<u16, BufferError> {
        Ok(LittleEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, BufferError> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    /// Reads one LEB128 value.
    pub fn read_varint(&mut self) -> Result<u64, BufferError> {
        let rest = &self.buf[self.pos..];
        match varint::decode_u64(rest) {
            Some((value, used)) => {
                self.pos += used;
                Ok(value)
            }
            None => {
                // Every remaining byte asked for more: the input simply ran out.
                if rest.len() < MAX_VARINT_BYTES && rest.iter().all(|b| b & 0x80 != 0) {
                    Err(BufferError::Truncated {
                        offset: self.pos,
                        needed: rest.len() + 1,
                        available: rest.len(),
                    })
                } else {
                    Err(BufferError::VarintOverflow { offset: self.pos })
                }
            }
        }
    }

    /// Reads a varint that must fit in a `u32` (counts, indices, offsets).
    pub fn read_varint_u32(&mut self) -> Result<u32, BufferError> {
        let offset = self.pos;
        let v = self.read_varint()?;
        u32::try_from(v).map_err(|_| BufferError::VarintOverflow { offset })
    }

    /// Reads a zigzag-mapped signed varint.
    pub fn read_zigzag(&mut self) -> Result<i64, BufferError> {
        Ok(varint::zigzag_decode(self.read_varint()?))
    }

    /// Reads a `varint byte_len | UTF-8` string.
    pub fn read_string(&mut self) -> Result<String, BufferError> {
        let offset = self.pos;
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| BufferError::VarintOverflow { offset })?;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| BufferError::InvalidUtf8 { offset })
    }
}
