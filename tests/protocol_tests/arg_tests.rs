//! Argument Encoding Tests
//!
//! These tests verify:
//! - Text, keyword, integer and float encodings
//! - Marker prefixes for binary and serialized payloads
//! - Rejection of text starting with the reserved byte

use bytes::Bytes;
use vermilion::protocol::{encode_args, keyword, raw, Arg, BINARY_MARKER, SERIALIZED_MARKER};
use vermilion::{BincodeSerializer, Datum, Serializer, VermilionError};

fn encode(arg: impl Into<Arg>) -> Bytes {
    arg.into().encode(&BincodeSerializer::new()).unwrap()
}

// =============================================================================
// Text & Numbers
// =============================================================================

#[test]
fn test_text_encodes_as_utf8() {
    assert_eq!(encode("hello"), Bytes::from_static(b"hello"));
    assert_eq!(encode(String::from("héllo")), Bytes::from("héllo".as_bytes()));
    assert_eq!(encode(keyword("GET")), Bytes::from_static(b"GET"));
}

#[test]
fn test_empty_text_is_allowed() {
    assert!(encode("").is_empty());
}

#[test]
fn test_integers_encode_as_decimal() {
    assert_eq!(encode(0i64), Bytes::from_static(b"0"));
    assert_eq!(encode(42u8), Bytes::from_static(b"42"));
    assert_eq!(encode(32767i32), Bytes::from_static(b"32767"));
    assert_eq!(encode(32768i32), Bytes::from_static(b"32768"));
    assert_eq!(encode(-17i64), Bytes::from_static(b"-17"));
    assert_eq!(encode(i64::MIN), Bytes::from(i64::MIN.to_string()));
}

#[test]
fn test_cached_integers_are_stable() {
    // Same value from the cache twice
    assert_eq!(encode(123i64), encode(123i64));
}

#[test]
fn test_wide_unsigned_beyond_i64_encodes_digits() {
    assert_eq!(encode(u64::MAX), Bytes::from(u64::MAX.to_string()));
    assert_eq!(encode(7usize), Bytes::from_static(b"7"));
}

#[test]
fn test_floats_use_shortest_round_trip_text() {
    assert_eq!(encode(0.1f64), Bytes::from_static(b"0.1"));
    assert_eq!(encode(-2.5f64), Bytes::from_static(b"-2.5"));
    assert_eq!(encode(0.1f32), Bytes::from_static(b"0.1"));

    for value in [1.0f64 / 3.0, 1e-7, 123456.789, f64::MAX] {
        let text = String::from_utf8(encode(value).to_vec()).unwrap();
        assert_eq!(text.parse::<f64>().unwrap(), value);
    }
}

// =============================================================================
// Reserved Leading Byte
// =============================================================================

#[test]
fn test_text_starting_with_nul_is_rejected() {
    let serializer = BincodeSerializer::new();

    let err = Arg::from("\0<sneaky").encode(&serializer).unwrap_err();
    assert!(matches!(err, VermilionError::Encode(_)));

    let err = keyword("\0name").encode(&serializer).unwrap_err();
    assert!(matches!(err, VermilionError::Encode(_)));
}

#[test]
fn test_nul_later_in_text_is_allowed() {
    assert_eq!(encode("a\0b"), Bytes::from_static(b"a\0b"));
}

#[test]
fn test_raw_wrap_passes_nul_through() {
    let payload = vec![0x00, b'<', 1, 2, 3];
    assert_eq!(encode(raw(payload.clone())), Bytes::from(payload));
}

// =============================================================================
// Markers
// =============================================================================

#[test]
fn test_byte_buffers_get_binary_marker() {
    let encoded = encode(vec![0xFFu8, 0x00, 0x10]);
    assert_eq!(&encoded[..2], &BINARY_MARKER[..]);
    assert_eq!(&encoded[2..], &[0xFF, 0x00, 0x10]);

    let encoded = encode(b"abc");
    assert_eq!(&encoded[..], b"\x00<abc");
}

#[test]
fn test_nil_and_opaque_values_get_serialized_marker() {
    let serializer = BincodeSerializer::new();

    let encoded = encode(Arg::Nil);
    assert_eq!(&encoded[..2], &SERIALIZED_MARKER[..]);
    assert_eq!(serializer.thaw(&encoded[2..], None).unwrap(), Datum::Nil);

    let datum = Datum::Map(vec![(Datum::from("k"), Datum::from(1i64))]);
    let encoded = encode(datum.clone());
    assert_eq!(&encoded[..2], &SERIALIZED_MARKER[..]);
    assert_eq!(serializer.thaw(&encoded[2..], None).unwrap(), datum);
}

#[test]
fn test_bool_and_none_route_through_serializer() {
    assert_eq!(&encode(true)[..2], &SERIALIZED_MARKER[..]);
    assert_eq!(encode(Option::<i64>::None), encode(Arg::Nil));
    assert_eq!(encode(Some(5i64)), Bytes::from_static(b"5"));
}

#[test]
fn test_encode_args_stops_at_first_bad_argument() {
    let serializer = BincodeSerializer::new();
    let result = encode_args(vec![Arg::from("SET"), Arg::from("\0bad"), Arg::from(1i64)], &serializer);
    assert!(matches!(result, Err(VermilionError::Encode(_))));

    let ok = encode_args(["SET", "k", "v"], &serializer).unwrap();
    assert_eq!(ok.len(), 3);
}
