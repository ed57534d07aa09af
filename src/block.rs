//! Header block assembly across HEADERS and CONTINUATION frames.
//!
//! A [`HeaderBlockParser`] is created per header block. The caller feeds it
//! each frame's payload as bytes arrive and calls
//! [`more_data`](HeaderBlockParser::more_data) when a CONTINUATION frame for
//! the same block shows up. Decoded fields are validated as the HPACK decoder
//! emits them:
//!
//! - an empty name, or a pseudo-header after a regular header, aborts the block
//! - an upper-case name marks the block invalid but decoding carries on
//!
//! Reference: RFC 7540 Sections 6.2, 6.10 and 8.1.2

use tracing::{debug, trace};

use crate::error::{H2Error, HpackError, Result};
use crate::frame::{frame_type, H2FrameHeader};
use crate::header_map::HeaderMap;
use crate::hpack::{FieldDecoder, H2Header, HeaderReceiver};
use crate::parser::PushBackParser;

/// Maximum accumulated header block size (256 KB).
/// Prevents unbounded memory growth from malicious/buggy CONTINUATION floods.
pub const MAX_HEADER_BLOCK_SIZE: usize = 256 * 1024;

/// Outcome of running a frame's preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreambleStatus {
    /// Not enough bytes yet; nothing was consumed.
    NeedMore,
    Done,
}

/// Frame-specific fields that precede the header block fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preamble {
    /// HEADERS frame: optional pad length and priority fields.
    /// `pad_length` is filled in once the preamble has been read.
    Headers { pad_length: usize },
    /// CONTINUATION frame: the payload is all header block.
    Continuation,
}

impl Preamble {
    pub fn headers() -> Self {
        Preamble::Headers { pad_length: 0 }
    }

    /// Consume the preamble from `buf`.
    ///
    /// Returns `NeedMore` without touching `buf` until every preamble byte is
    /// available, so it can be called again from scratch.
    pub fn handle_before_header(&mut self, buf: &mut &[u8], header: &H2FrameHeader) -> Result<PreambleStatus> {
        let Preamble::Headers { pad_length } = self else {
            return Ok(PreambleStatus::Done);
        };

        let mut needed = 0;
        if header.is_padded() {
            needed += 1;
        }
        if header.has_priority() {
            needed += 5; // Stream dependency (4 bytes) + weight (1 byte)
        }
        if header.length < needed as u32 {
            return Err(H2Error::FrameSize {
                length: header.length,
                needed,
            });
        }
        if buf.len() < needed {
            return Ok(PreambleStatus::NeedMore);
        }

        if header.is_padded() {
            let pad = buf[0] as usize;
            let available = header.length as usize - needed;
            if pad > available {
                return Err(H2Error::InvalidPadding {
                    pad_length: pad,
                    available,
                });
            }
            *pad_length = pad;
        }
        *buf = &buf[needed..];
        Ok(PreambleStatus::Done)
    }

    /// Padding at the end of the frame, known once the preamble is handled.
    pub fn pad_length(&self) -> usize {
        match self {
            Preamble::Headers { pad_length } => *pad_length,
            Preamble::Continuation => 0,
        }
    }
}

/// Assembles one header block from a HEADERS frame and its CONTINUATIONs.
#[derive(Debug)]
pub struct HeaderBlockParser {
    parser: PushBackParser,
    block: BlockState,
}

/// Everything except the push-back buffer, split out so the parser and the
/// field handler can be borrowed at the same time.
#[derive(Debug)]
struct BlockState {
    header_map: HeaderMap,
    preamble: Preamble,
    preamble_handled: bool,
    /// Bytes of the current frame the decoder has not consumed yet; `None`
    /// until the first frame header has been seen.
    frame_remaining: Option<usize>,
    declared_length: usize,
    block_length: usize,
    stream_id: Option<u32>,
    invalid: bool,
    processing_pseudo_headers: bool,
}

impl HeaderBlockParser {
    /// `frame_length` is the declared payload length of the frame that opens
    /// the block; `preamble` describes that frame's leading fields.
    pub fn new(frame_length: u32, preamble: Preamble) -> Self {
        let frame_length = frame_length as usize;
        Self {
            parser: PushBackParser::new(frame_length),
            block: BlockState {
                header_map: HeaderMap::new(),
                preamble,
                preamble_handled: false,
                frame_remaining: None,
                declared_length: frame_length,
                block_length: frame_length,
                stream_id: None,
                invalid: false,
                processing_pseudo_headers: true,
            },
        }
    }

    /// Header block opened by a HEADERS frame.
    pub fn for_headers(header: &H2FrameHeader) -> Self {
        Self::new(header.length, Preamble::headers())
    }

    /// Feed the bytes of the current frame that are available right now.
    ///
    /// `input` is advanced past every byte that belongs to the frame; bytes
    /// after the frame's end are left for the caller. Call again with the
    /// next bytes as they arrive. The decoder is the connection's HPACK
    /// decoder and receives this block's fields for the duration of the call.
    pub fn parse(&mut self, input: &mut &[u8], header: &H2FrameHeader, decoder: &mut dyn FieldDecoder) -> Result<()> {
        let block = &mut self.block;
        self.parser
            .parse(input, header, |buf, header| block.handle_data(buf, header, &mut *decoder))
    }

    /// A CONTINUATION frame of `len` payload bytes extends this block.
    pub fn more_data(&mut self, len: u32) -> Result<()> {
        let len = len as usize;
        let block = &mut self.block;
        let size = block.block_length + len;
        if size > MAX_HEADER_BLOCK_SIZE {
            return Err(H2Error::HeaderBlockTooLarge {
                size,
                max: MAX_HEADER_BLOCK_SIZE,
            });
        }
        block.block_length = size;
        block.frame_remaining = Some(block.frame_remaining.unwrap_or(block.declared_length) + len);
        block.preamble = Preamble::Continuation;
        block.preamble_handled = false;
        self.parser.more_data(len);
        Ok(())
    }

    pub fn header_map(&self) -> &HeaderMap {
        &self.block.header_map
    }

    pub fn into_header_map(self) -> HeaderMap {
        self.block.header_map
    }

    /// A field name contained upper-case characters.
    pub fn is_invalid(&self) -> bool {
        self.block.invalid
    }

    /// Every byte declared so far was received and decoded.
    pub fn is_finished(&self) -> bool {
        self.parser.is_finished() && self.block.frame_remaining == Some(0)
    }

    pub fn frame_remaining(&self) -> Option<usize> {
        self.block.frame_remaining
    }
}

impl BlockState {
    fn handle_data(&mut self, buf: &mut &[u8], header: &H2FrameHeader, decoder: &mut dyn FieldDecoder) -> Result<usize> {
        self.check_frame(header)?;
        let frame_remaining = *self.frame_remaining.get_or_insert(header.length as usize);
        let more_data_this_frame = buf.len() < frame_remaining;

        let start = buf.len();
        let result = self.decode_frame(buf, header, more_data_this_frame, decoder);
        let discarded = *result.as_ref().unwrap_or(&0);
        let used = start - buf.len() + discarded;

        debug_assert!(used <= frame_remaining, "consumed {} of {} frame bytes", used, frame_remaining);
        self.frame_remaining = Some(frame_remaining.saturating_sub(used));
        trace!(
            stream_id = header.stream_id,
            used,
            frame_remaining = frame_remaining.saturating_sub(used),
            "header block fragment"
        );
        result
    }

    /// Returns the number of trailing padding bytes to drop.
    fn decode_frame(
        &mut self,
        buf: &mut &[u8],
        header: &H2FrameHeader,
        more_data_this_frame: bool,
        decoder: &mut dyn FieldDecoder,
    ) -> Result<usize> {
        let start = buf.len();
        if !self.preamble_handled {
            if self.preamble.handle_before_header(buf, header)? == PreambleStatus::NeedMore {
                return Ok(0);
            }
            self.preamble_handled = true;
        }

        let preamble_used = start - buf.len();
        let padding = self.preamble.pad_length();
        let frame_remaining = self.frame_remaining.unwrap_or(0);
        let block_remaining = frame_remaining
            .saturating_sub(preamble_used)
            .saturating_sub(padding);

        let available = buf.len().min(block_remaining);
        let mut fragment = &buf[..available];
        let result = decoder.decode(&mut fragment, more_data_this_frame, self);
        let decoded = available - fragment.len();
        *buf = &buf[decoded..];
        result?;

        if more_data_this_frame {
            return Ok(0);
        }
        let undecoded = block_remaining - decoded;
        if undecoded > 0 && header.is_end_headers() {
            return Err(HpackError::Truncated(undecoded).into());
        }
        Ok(padding)
    }

    fn check_frame(&mut self, header: &H2FrameHeader) -> Result<()> {
        let expected = match self.preamble {
            Preamble::Headers { .. } => frame_type::HEADERS,
            Preamble::Continuation => frame_type::CONTINUATION,
        };
        if header.frame_type != expected {
            return Err(H2Error::UnexpectedFrame(format!(
                "Unexpected frame type {} for stream {} while reading header block",
                header.frame_type, header.stream_id
            )));
        }
        match self.stream_id {
            Some(pending_stream) if pending_stream != header.stream_id => {
                Err(H2Error::UnexpectedFrame(format!(
                    "CONTINUATION for stream {} but pending headers on stream {}",
                    header.stream_id, pending_stream
                )))
            }
            Some(_) => Ok(()),
            None => {
                if header.length as usize > MAX_HEADER_BLOCK_SIZE {
                    return Err(H2Error::HeaderBlockTooLarge {
                        size: header.length as usize,
                        max: MAX_HEADER_BLOCK_SIZE,
                    });
                }
                self.stream_id = Some(header.stream_id);
                Ok(())
            }
        }
    }
}

impl HeaderReceiver for BlockState {
    fn emit_header(&mut self, name: &[u8], value: &[u8], never_index: bool) -> Result<()> {
        self.header_map.push(H2Header {
            name: name.to_vec(),
            value: String::from_utf8_lossy(value).into_owned(),
            never_index,
        });

        if name.is_empty() {
            return Err(H2Error::EmptyHeaderName);
        }
        if name[0] == b':' {
            if !self.processing_pseudo_headers {
                return Err(H2Error::PseudoHeaderOrder {
                    name: String::from_utf8_lossy(name).into_owned(),
                });
            }
        } else {
            self.processing_pseudo_headers = false;
        }
        if name.iter().any(u8::is_ascii_uppercase) {
            self.invalid = true;
            debug!(
                "Malformed request, header {} contains uppercase characters",
                String::from_utf8_lossy(name)
            );
        }
        Ok(())
    }
}
