//! Property tests: delivery pattern never changes the decoded headers

use h2_header_block::{
    create_continuation_frame, create_headers_frame, H2Header, HeaderMap, HpackDecoder,
    HpackEncoder,
};
use proptest::prelude::*;

use super::{decode_wire, literal};

/// Static table entries (RFC 7541 Appendix A) reachable from a `0x0F`
/// indexed-name literal, keyed by index.
const STATIC_NAMES: &[(u8, &str)] = &[
    (15, "accept-charset"),
    (16, "accept-encoding"),
    (17, "accept-language"),
    (19, "accept"),
    (24, "cache-control"),
];

fn arb_headers() -> impl Strategy<Value = Vec<H2Header>> {
    let regular = ("[a-z][a-z0-9-]{0,15}", "[ -~]{0,40}")
        .prop_map(|(name, value)| H2Header::new(name, value));
    prop::collection::vec(regular, 0..12).prop_map(|fields| {
        let mut headers = vec![
            H2Header::new(":method", "GET"),
            H2Header::new(":path", "/index.html"),
        ];
        headers.extend(fields);
        headers
    })
}

/// One hand-built field representation and the header it decodes to.
fn arb_field() -> impl Strategy<Value = (Vec<u8>, H2Header)> {
    let name = "[a-z][a-z0-9-]{0,15}";
    let value = "[ -~]{0,40}";
    prop_oneof![
        (name, value).prop_map(|(n, v)| (literal(&n, &v), H2Header::new(n, v))),
        (name, value).prop_map(|(n, v)| {
            let mut rep = literal(&n, &v);
            rep[0] = 0x10;
            (rep, H2Header::never_indexed(n, v))
        }),
        (prop::sample::select(STATIC_NAMES), value).prop_map(|((index, n), v)| {
            let mut rep = vec![0x0F, index - 15, v.len() as u8];
            rep.extend_from_slice(v.as_bytes());
            (rep, H2Header::new(n, v))
        }),
    ]
}

/// A block mixing table size updates, never-indexed and indexed-name
/// literals, with the headers it must decode to.
fn arb_mixed_block() -> impl Strategy<Value = (Vec<u8>, Vec<H2Header>)> {
    let size_updates = prop_oneof![
        Just(vec![]),
        Just(vec![0x20]),
        Just(vec![0x3F, 0xE1, 0x1F]),
        Just(vec![0x20, 0x3F, 0xE1, 0x1F]),
    ];
    (size_updates, prop::collection::vec(arb_field(), 0..10)).prop_map(|(mut block, fields)| {
        block.extend_from_slice(&[0x82, 0x84]);
        let mut headers = vec![H2Header::new(":method", "GET"), H2Header::new(":path", "/")];
        for (rep, header) in fields {
            block.extend(rep);
            headers.push(header);
        }
        (block, headers)
    })
}

/// Split `block` at `cuts` into a HEADERS frame and CONTINUATIONs.
fn split_into_frames(block: &[u8], cuts: &[prop::sample::Index]) -> Vec<u8> {
    let mut points: Vec<usize> = cuts.iter().map(|c| c.index(block.len() + 1)).collect();
    points.sort_unstable();
    points.dedup();
    let mut bounds = vec![0];
    bounds.extend(points);
    bounds.push(block.len());
    bounds.dedup();

    let pieces: Vec<&[u8]> = bounds.windows(2).map(|w| &block[w[0]..w[1]]).collect();
    let last = pieces.len() - 1;
    let mut wire = Vec::new();
    for (i, piece) in pieces.iter().enumerate() {
        if i == 0 {
            wire.extend(create_headers_frame(1, piece, false, i == last));
        } else {
            wire.extend(create_continuation_frame(1, piece, i == last));
        }
    }
    wire
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn chunked_delivery_matches_single_feed(headers in arb_headers(), chunk in 1usize..32) {
        let block = HpackEncoder::new().encode(&headers);
        let wire = create_headers_frame(1, &block, true, true);

        let parser = decode_wire(&wire, chunk, &mut HpackDecoder::new()).unwrap();
        let expected: HeaderMap = headers.into_iter().collect();

        prop_assert_eq!(parser.header_map(), &expected);
        prop_assert!(parser.is_finished());
        prop_assert_eq!(parser.frame_remaining(), Some(0));
        prop_assert!(!parser.is_invalid());
    }

    #[test]
    fn frame_split_matches_single_frame(
        headers in arb_headers(),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..4),
        chunk in 1usize..16,
    ) {
        let block = HpackEncoder::new().encode(&headers);
        let wire = split_into_frames(&block, &cuts);

        let parser = decode_wire(&wire, chunk, &mut HpackDecoder::new()).unwrap();
        let decoded: Vec<H2Header> = parser.header_map().iter().cloned().collect();

        prop_assert_eq!(decoded, headers);
        prop_assert!(parser.is_finished());
    }

    #[test]
    fn mixed_representations_match_single_feed(
        (block, headers) in arb_mixed_block(),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..4),
        chunk in 1usize..16,
    ) {
        let single = create_headers_frame(1, &block, false, true);
        let whole = decode_wire(&single, single.len(), &mut HpackDecoder::new()).unwrap();
        let expected: HeaderMap = headers.into_iter().collect();
        prop_assert_eq!(whole.header_map(), &expected);

        let chunked = decode_wire(&single, chunk, &mut HpackDecoder::new()).unwrap();
        prop_assert_eq!(chunked.header_map(), &expected);
        prop_assert!(chunked.is_finished());

        let split = decode_wire(&split_into_frames(&block, &cuts), chunk, &mut HpackDecoder::new()).unwrap();
        prop_assert_eq!(split.header_map(), &expected);
        prop_assert!(split.is_finished());
        prop_assert!(!split.is_invalid());
    }
}
