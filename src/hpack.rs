//! HPACK: Header Compression for HTTP/2 (RFC 7541)
//!
//! Wrapper around `fluke-hpack` providing the H2Header type and the
//! incremental decoder/encoder interfaces used by the header block parser.
//!
//! `fluke-hpack` only decodes complete input, while header blocks reach us a
//! few bytes at a time. [`HpackDecoder`] therefore measures each field
//! representation from its length prefixes first and only hands complete
//! representations to `fluke-hpack`. A partial field stays in the caller's
//! buffer until more bytes arrive.

use std::borrow::Cow;

use tracing::trace;

use crate::error::{H2Error, HpackError, Result};
use crate::header_map::HeaderMap;

/// A decoded HTTP/2 header
#[derive(Debug, Clone, PartialEq)]
pub struct H2Header {
    pub name: Vec<u8>,
    pub value: String,
    /// Field came from a "never indexed" literal and must not be added to
    /// a compression table when re-encoded.
    pub never_index: bool,
}

impl H2Header {
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            never_index: false,
        }
    }

    pub fn never_indexed(name: impl Into<Vec<u8>>, value: impl Into<String>) -> Self {
        Self {
            never_index: true,
            ..Self::new(name, value)
        }
    }

    /// Name starts with `:`.
    pub fn is_pseudo(&self) -> bool {
        self.name.first() == Some(&b':')
    }

    pub fn name_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// Receives header fields as the decoder produces them.
///
/// Returning an error aborts decoding; the field that triggered it still
/// counts as consumed.
pub trait HeaderReceiver {
    fn emit_header(&mut self, name: &[u8], value: &[u8], never_index: bool) -> Result<()>;
}

impl HeaderReceiver for Vec<H2Header> {
    fn emit_header(&mut self, name: &[u8], value: &[u8], never_index: bool) -> Result<()> {
        self.push(H2Header {
            name: name.to_vec(),
            value: String::from_utf8_lossy(value).into_owned(),
            never_index,
        });
        Ok(())
    }
}

impl HeaderReceiver for HeaderMap {
    fn emit_header(&mut self, name: &[u8], value: &[u8], never_index: bool) -> Result<()> {
        self.push(H2Header {
            name: name.to_vec(),
            value: String::from_utf8_lossy(value).into_owned(),
            never_index,
        });
        Ok(())
    }
}

/// A stateful decoder that accepts a header block in pieces.
pub trait FieldDecoder {
    /// Decode as many complete fields from `buf` as possible, advancing it
    /// past every byte consumed.
    ///
    /// `more_data` is true when more bytes of the current frame are still to
    /// arrive. Bytes left in `buf` are an incomplete field that the caller
    /// must present again, followed by the next bytes of the block.
    fn decode(&mut self, buf: &mut &[u8], more_data: bool, receiver: &mut dyn HeaderReceiver) -> Result<()>;
}

/// HPACK decoder for HTTP/2 header blocks.
/// Wraps `fluke_hpack::Decoder` which maintains dynamic table state per-connection.
pub struct HpackDecoder {
    inner: fluke_hpack::Decoder<'static>,
}

impl std::fmt::Debug for HpackDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HpackDecoder").finish()
    }
}

impl Default for HpackDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackDecoder {
    pub fn new() -> Self {
        Self {
            inner: fluke_hpack::Decoder::new(),
        }
    }

    /// Decode a complete HPACK-encoded header block into H2Headers.
    pub fn decode_block(&mut self, data: &[u8]) -> Result<Vec<H2Header>> {
        let mut headers = Vec::new();
        let mut buf = data;
        self.decode(&mut buf, false, &mut headers)?;
        if !buf.is_empty() {
            return Err(HpackError::Truncated(buf.len()).into());
        }
        Ok(headers)
    }
}

impl FieldDecoder for HpackDecoder {
    fn decode(&mut self, buf: &mut &[u8], more_data: bool, receiver: &mut dyn HeaderReceiver) -> Result<()> {
        while !buf.is_empty() {
            let Some((len, field_start)) = representation_run(buf)? else {
                trace!(pending = buf.len(), more_data, "header field incomplete, waiting for more bytes");
                break;
            };
            let (field, rest) = buf.split_at(len);
            let never_index = field[field_start] & 0xF0 == 0x10;

            let mut emitted: Result<()> = Ok(());
            self.inner
                .decode_with_cb(field, |name, value| {
                    if emitted.is_ok() {
                        emitted = receiver.emit_header(&name, &value, never_index);
                    }
                })
                .map_err(|e| H2Error::from(HpackError::Decode(format!("{:?}", e))))?;
            *buf = rest;
            emitted?;
        }
        Ok(())
    }
}

/// Length of the field representation at the start of `buf`, or `None` if
/// `buf` ends before the representation does (RFC 7541 Section 6).
pub fn field_length(buf: &[u8]) -> std::result::Result<Option<usize>, HpackError> {
    let Some(&first) = buf.first() else {
        return Ok(None);
    };

    // 1xxxxxxx indexed, 01xxxxxx literal with incremental indexing,
    // 001xxxxx table size update, 000xxxxx literal without/never indexed
    let (prefix_bits, literal) = if first & 0x80 != 0 {
        (7, false)
    } else if first & 0xC0 == 0x40 {
        (6, true)
    } else if is_size_update(first) {
        (5, false)
    } else {
        (4, true)
    };

    let Some((index, mut pos)) = integer_length(buf, prefix_bits)? else {
        return Ok(None);
    };
    if !literal {
        return Ok(Some(pos));
    }

    // index 0 means the name follows as a string literal
    let strings = if index == 0 { 2 } else { 1 };
    for _ in 0..strings {
        match string_length(&buf[pos..])? {
            Some(len) => pos += len,
            None => return Ok(None),
        }
    }
    Ok(Some(pos))
}

/// Length of the next run that `fluke-hpack` accepts on its own: any
/// dynamic table size updates plus the complete field that follows them.
/// Also returns the offset of that field within the run.
///
/// `fluke-hpack` rejects input ending in a size update, so an update is held
/// back until its field has arrived. An update that ends the block is left
/// undecoded and surfaces as a truncated block.
fn representation_run(buf: &[u8]) -> std::result::Result<Option<(usize, usize)>, HpackError> {
    let mut pos = 0;
    loop {
        let Some(len) = field_length(&buf[pos..])? else {
            return Ok(None);
        };
        if !is_size_update(buf[pos]) {
            return Ok(Some((pos + len, pos)));
        }
        pos += len;
    }
}

/// `001xxxxx`: dynamic table size update (RFC 7541 Section 6.3)
fn is_size_update(first: u8) -> bool {
    first & 0xE0 == 0x20
}

/// Decode a prefix integer (RFC 7541 Section 5.1), returning the value and
/// the number of bytes it occupies.
fn integer_length(buf: &[u8], prefix_bits: u8) -> std::result::Result<Option<(usize, usize)>, HpackError> {
    let Some(&first) = buf.first() else {
        return Ok(None);
    };
    let max_prefix_value = (1usize << prefix_bits) - 1;
    let mut value = first as usize & max_prefix_value;
    if value < max_prefix_value {
        return Ok(Some((value, 1)));
    }

    let mut shift = 0u32;
    for (i, &byte) in buf.iter().enumerate().skip(1) {
        if shift > 28 {
            return Err(HpackError::IntegerOverflow);
        }
        let add = ((byte & 0x7F) as usize)
            .checked_mul(1usize << shift)
            .ok_or(HpackError::IntegerOverflow)?;
        value = value.checked_add(add).ok_or(HpackError::IntegerOverflow)?;
        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
        shift += 7;
    }
    Ok(None)
}

/// Total length of a string literal: H bit + 7-bit length prefix, then data.
fn string_length(buf: &[u8]) -> std::result::Result<Option<usize>, HpackError> {
    let Some((len, used)) = integer_length(buf, 7)? else {
        return Ok(None);
    };
    let total = used.checked_add(len).ok_or(HpackError::IntegerOverflow)?;
    Ok((buf.len() >= total).then_some(total))
}

/// HPACK encoder for HTTP/2 header blocks.
/// Wraps `fluke_hpack::Encoder` which maintains dynamic table state per-connection.
pub struct HpackEncoder {
    inner: fluke_hpack::Encoder<'static>,
}

impl std::fmt::Debug for HpackEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HpackEncoder").finish()
    }
}

impl Default for HpackEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackEncoder {
    pub fn new() -> Self {
        Self {
            inner: fluke_hpack::Encoder::new(),
        }
    }

    /// Encode headers into an HPACK header block.
    ///
    /// `fluke-hpack` has no never-indexed representation, so the
    /// `never_index` flag is not carried into the output.
    pub fn encode(&mut self, headers: &[H2Header]) -> Vec<u8> {
        let pairs: Vec<(&[u8], &[u8])> = headers
            .iter()
            .map(|h| (h.name.as_slice(), h.value.as_bytes()))
            .collect();
        self.inner.encode(pairs)
    }
}

// ============================================================================
// Tests
// ============================================================================
