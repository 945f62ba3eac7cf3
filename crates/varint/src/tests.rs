use super::*;

fn encoded(value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    encode_u64(value, &mut out);
    out
}

// -------------------- Unsigned LEB128 --------------------

#[test]
fn single_byte_values() {
    assert_eq!(encoded(0), vec![0x00]);
    assert_eq!(encoded(1), vec![0x01]);
    assert_eq!(encoded(127), vec![0x7F]);
}

#[test]
fn two_byte_boundaries() {
    assert_eq!(encoded(128), vec![0x80, 0x01]);
    assert_eq!(encoded(300), vec![0xAC, 0x02]);
    assert_eq!(encoded(16_383), vec![0xFF, 0x7F]);
    assert_eq!(encoded(16_384), vec![0x80, 0x80, 0x01]);
}

#[test]
fn max_value_takes_ten_bytes() {
    let out = encoded(u64::MAX);
    assert_eq!(out.len(), MAX_VARINT_BYTES);
    assert_eq!(decode_u64(&out), Some((u64::MAX, MAX_VARINT_BYTES)));
}

#[test]
fn encode_returns_written_length() {
    let mut out = vec![0xEE];
    let n = encode_u64(16_384, &mut out);
    assert_eq!(n, 3);
    assert_eq!(out.len(), 4);
    assert_eq!(out[0], 0xEE, "existing bytes must be preserved");
}

#[test]
fn encoded_len_matches_encoder() {
    for shift in 0..64 {
        for v in [(1u64 << shift) - 1, 1u64 << shift, (1u64 << shift) + 1] {
            assert_eq!(encoded_len(v), encoded(v).len(), "value {}", v);
        }
    }
    assert_eq!(encoded_len(u64::MAX), 10);
}

#[test]
fn decode_reports_consumed_bytes_and_ignores_tail() {
    let buf = [0xAC, 0x02, 0xFF, 0xFF];
    assert_eq!(decode_u64(&buf), Some((300, 2)));
}

#[test]
fn decode_incomplete_sequence_is_none() {
    assert_eq!(decode_u64(&[]), None);
    assert_eq!(decode_u64(&[0x80]), None);
    assert_eq!(decode_u64(&[0xFF, 0xFF, 0xFF]), None);
}

#[test]
fn decode_overlong_sequence_is_none() {
    let buf = [0xFF; 11];
    assert_eq!(decode_u64(&buf), None);
}

#[test]
fn decode_overflowing_tenth_byte_is_none() {
    let mut buf = vec![0xFF; 9];
    buf.push(0x02);
    assert_eq!(decode_u64(&buf), None);
}

// -------------------- Zigzag --------------------

#[test]
fn zigzag_small_values_interleave() {
    assert_eq!(zigzag_encode(0), 0);
    assert_eq!(zigzag_encode(-1), 1);
    assert_eq!(zigzag_encode(1), 2);
    assert_eq!(zigzag_encode(-2), 3);
    assert_eq!(zigzag_encode(2), 4);
}

#[test]
fn zigzag_extremes() {
    assert_eq!(zigzag_encode(i64::MAX), u64::MAX - 1);
    assert_eq!(zigzag_encode(i64::MIN), u64::MAX);
    assert_eq!(zigzag_decode(u64::MAX), i64::MIN);
    assert_eq!(zigzag_decode(u64::MAX - 1), i64::MAX);
}

#[test]
fn zigzag_inverse_over_mixed_values() {
    let mut v: i64 = 1;
    for _ in 0..62 {
        for n in [v, -v, v - 1, -(v - 1)] {
            assert_eq!(zigzag_decode(zigzag_encode(n)), n);
        }
        v <<= 1;
    }
}

#[test]
fn small_negative_deltas_stay_one_byte() {
    let mut out = Vec::new();
    assert_eq!(encode_i64(-64, &mut out), 1);
    assert_eq!(decode_i64(&out), Some((-64, 1)));
    out.clear();
    assert_eq!(encode_i64(-65, &mut out), 2);
}
