//! # VarInt - LEB128 and Zigzag integers
//!
//! Variable-length integer primitives shared by every BAST section.
//!
//! Unsigned values are written as LEB128: 7 payload bits per byte, least
//! significant group first, with the high bit of each byte set when more
//! bytes follow. Small values stay small:
//!
//! | Value range        | Bytes |
//! |--------------------|-------|
//! | 0 ..= 127          | 1     |
//! | 128 ..= 16_383     | 2     |
//! | 16_384 ..= 2^21-1  | 3     |
//! | ...                | ...   |
//! | u64::MAX           | 10    |
//!
//! Signed deltas go through the zigzag bijection first so that `-1` encodes
//! as `1`, `1` as `2`, `-2` as `3`, and so on.
//!
//! ## Example
//!
//! ```rust
//! let mut out = Vec::new();
//! varint::encode_u64(300, &mut out);
//! assert_eq!(out, vec![0xAC, 0x02]);
//! assert_eq!(varint::decode_u64(&out), Some((300, 2)));
//!
//! assert_eq!(varint::zigzag_encode(-1), 1);
//! assert_eq!(varint::zigzag_decode(1), -1);
//! ```

/// Largest number of bytes a LEB128-encoded `u64` can occupy.
pub const MAX_VARINT_BYTES: usize = 10;

const PAYLOAD_MASK: u8 = 0x7F;
const CONTINUATION_BIT: u8 = 0x80;

/// Appends `value` to `out` as LEB128 and returns the number of bytes written.
pub fn encode_u64(mut value: u64, out: &mut Vec<u8>) -> usize {
    let start = out.len();
    while value >= u64::from(CONTINUATION_BIT) {
        out.push((value as u8 & PAYLOAD_MASK) | CONTINUATION_BIT);
        value >>= 7;
    }
    out.push(value as u8);
    out.len() - start
}

/// Decodes one LEB128 value from the front of `buf`.
///
/// Returns `(value, bytes_consumed)`, or `None` when `buf` ends before the
/// final byte or the sequence does not fit in a `u64`.
#[must_use]
pub fn decode_u64(buf: &[u8]) -> Option<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_BYTES {
            return None;
        }
        let payload = u64::from(byte & PAYLOAD_MASK);
        // The tenth byte may only contribute the single remaining bit.
        if shift == 63 && payload > 1 {
            return None;
        }
        result |= payload << shift;
        if byte & CONTINUATION_BIT == 0 {
            return Some((result, i + 1));
        }
        shift += 7;
    }
    None
}

/// Number of bytes [`encode_u64`] would emit for `value`.
#[must_use]
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Maps a signed integer onto an unsigned one: `(n << 1) ^ (n >> 63)`.
#[must_use]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Exact inverse of [`zigzag_encode`].
#[must_use]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Appends a zigzag-mapped signed value as LEB128.
pub fn encode_i64(value: i64, out: &mut Vec<u8>) -> usize {
    encode_u64(zigzag_encode(value), out)
}

/// Decodes a zigzag-mapped signed value from the front of `buf`.
#[must_use]
pub fn decode_i64(buf: &[u8]) -> Option<(i64, usize)> {
    decode_u64(buf).map(|(v, n)| (zigzag_decode(v), n))
}

#[cfg(test)]
mod tests;
