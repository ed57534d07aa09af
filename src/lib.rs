//! h2-header-block: incremental, sans-I/O HTTP/2 header block decoding
//!
//! This crate rebuilds the headers of one HTTP/2 message from a header block
//! that may span a HEADERS frame and any number of CONTINUATION frames, each
//! of which may be delivered a few bytes at a time.
//!
//! # Features
//!
//! - **Sans-I/O Design**: No async runtime dependencies (no tokio)
//! - **Incremental**: Feed whatever bytes have arrived; partial fields are
//!   kept and resumed on the next call
//! - **Frame Accounting**: Bytes past the current frame are never consumed,
//!   CONTINUATION frames extend the block's budget
//! - **Field Validation**: Pseudo-header ordering and empty names abort the
//!   block, upper-case names mark it invalid (RFC 7540 Section 8.1.2)
//! - **HPACK Support**: Header compression via fluke-hpack
//!
//! # Quick Start
//!
//! ```rust
//! use h2_header_block::{HeaderBlockParser, HpackDecoder, H2FrameHeader, flags, frame_type};
//!
//! // One decoder per connection, shared by every header block on it
//! let mut decoder = HpackDecoder::new();
//!
//! // HEADERS frame: :method GET, :scheme http, :path /
//! let block = [0x82, 0x86, 0x84];
//! let header = H2FrameHeader::new(3, frame_type::HEADERS, flags::END_HEADERS, 1);
//! let mut parser = HeaderBlockParser::for_headers(&header);
//!
//! // Bytes may arrive in any number of pieces
//! for chunk in block.chunks(2) {
//!     let mut input = chunk;
//!     parser.parse(&mut input, &header, &mut decoder).unwrap();
//! }
//!
//! assert!(parser.is_finished());
//! assert!(!parser.is_invalid());
//! assert_eq!(parser.header_map().get(":method"), Some("GET"));
//! ```
//!
//! # Architecture
//!
//! - [`parser`]: frame-bounded byte budget with push-back of unconsumed bytes
//! - [`hpack`]: incremental decoder contract and the fluke-hpack adapter
//! - [`block`]: header block assembly, frame preambles and field validation
//!
//! It does NOT provide:
//! - Frame splitting from a raw byte stream (you provide frame headers)
//! - Connection or stream state management
//! - A policy for invalid blocks; [`HeaderBlockParser::is_invalid`] reports,
//!   the caller decides

pub mod block;
pub mod error;
pub mod frame;
pub mod header_map;
pub mod hpack;
pub mod parser;

pub use block::{HeaderBlockParser, Preamble, PreambleStatus, MAX_HEADER_BLOCK_SIZE};
pub use error::{H2Error, HpackError, Result};
pub use frame::{
    H2FrameHeader, DEFAULT_MAX_FRAME_SIZE, FRAME_HEADER_LEN,
    create_continuation_frame, create_headers_frame,
    error_code, flags, frame_type,
};
pub use header_map::HeaderMap;
pub use hpack::{FieldDecoder, H2Header, HeaderReceiver, HpackDecoder, HpackEncoder};
pub use parser::PushBackParser;
