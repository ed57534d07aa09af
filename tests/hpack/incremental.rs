//! Tests for feeding the HPACK decoder a block in pieces

use h2_header_block::{FieldDecoder, H2Header, HeaderMap, HpackDecoder, HpackEncoder};

fn sample_block() -> (Vec<H2Header>, Vec<u8>) {
    let headers = vec![
        H2Header::new(":method", "POST"),
        H2Header::new(":path", "/upload?id=42"),
        H2Header::new("content-type", "multipart/form-data"),
        H2Header::new("x-trace", "0123456789abcdef"),
    ];
    let encoded = HpackEncoder::new().encode(&headers);
    (headers, encoded)
}

#[test]
fn test_byte_at_a_time_matches_whole_block() {
    let (headers, encoded) = sample_block();
    let mut decoder = HpackDecoder::new();
    let mut decoded = Vec::new();

    // Keep unconsumed bytes and append the next one, as a caller would
    let mut pending = Vec::new();
    for (i, byte) in encoded.iter().enumerate() {
        pending.push(*byte);
        let mut buf = &pending[..];
        let more = i + 1 < encoded.len();
        decoder.decode(&mut buf, more, &mut decoded).unwrap();
        let consumed = pending.len() - buf.len();
        pending.drain(..consumed);
    }

    assert!(pending.is_empty());
    assert_eq!(decoded, headers);
}

#[test]
fn test_decode_into_header_map() {
    let (_, encoded) = sample_block();
    let mut decoder = HpackDecoder::new();
    let mut map = HeaderMap::new();

    let mut buf = &encoded[..];
    decoder.decode(&mut buf, false, &mut map).unwrap();

    assert!(buf.is_empty());
    assert_eq!(map.get(":path"), Some("/upload?id=42"));
    assert_eq!(map.len(), 4);
}

#[test]
fn test_partial_field_not_consumed() {
    let mut decoder = HpackDecoder::new();
    let mut decoded = Vec::new();

    // literal name "abc" but only two name bytes present
    let data = [0x82, 0x00, 0x03, b'a', b'b'];
    let mut buf = &data[..];
    decoder.decode(&mut buf, true, &mut decoded).unwrap();

    assert_eq!(decoded.len(), 1);
    assert_eq!(buf, &[0x00, 0x03, b'a', b'b']);
}
