//! Incremental, frame-bounded parsing with push-back.
//!
//! A [`PushBackParser`] owns the byte budget of one logical unit (a header
//! block spanning a HEADERS frame and its CONTINUATIONs). Each call takes
//! only the bytes of the unit that are available right now and hands them to
//! a handler. Whatever the handler leaves unconsumed is kept and put in front
//! of the next call's bytes, so the handler never sees a partial field twice
//! from different buffers.

use tracing::trace;

use crate::error::Result;
use crate::frame::H2FrameHeader;

#[derive(Debug, Default)]
pub struct PushBackParser {
    /// Bytes of the unit not yet taken from the wire.
    remaining: usize,
    /// Bytes taken from the wire that the handler did not consume.
    pushed_back: Vec<u8>,
}

impl PushBackParser {
    pub fn new(frame_length: usize) -> Self {
        Self {
            remaining: frame_length,
            pushed_back: Vec::new(),
        }
    }

    /// Feed the bytes currently available in `input`.
    ///
    /// At most [`remaining`](Self::remaining) bytes are taken; `input` is
    /// advanced past them and anything after belongs to the next frame.
    /// The handler advances its slice over the bytes it consumed and returns
    /// how many bytes at the end of the unconsumed rest carry no data (frame
    /// padding); those are dropped instead of pushed back. The unconsumed
    /// rest is kept even when the handler fails.
    pub fn parse<F>(&mut self, input: &mut &[u8], header: &H2FrameHeader, mut handler: F) -> Result<()>
    where
        F: FnMut(&mut &[u8], &H2FrameHeader) -> Result<usize>,
    {
        let take = input.len().min(self.remaining);
        let (chunk, rest) = input.split_at(take);
        *input = rest;
        self.remaining -= take;

        let result = if self.pushed_back.is_empty() {
            let mut data = chunk;
            let result = handler(&mut data, header);
            let keep = data.len() - discarded(&result, data.len());
            self.pushed_back.extend_from_slice(&data[..keep]);
            result
        } else {
            let mut combined = std::mem::take(&mut self.pushed_back);
            combined.extend_from_slice(chunk);
            let mut data = &combined[..];
            let result = handler(&mut data, header);
            let unconsumed = data.len();
            let keep = unconsumed - discarded(&result, unconsumed);
            let consumed = combined.len() - unconsumed;
            combined.drain(..consumed);
            combined.truncate(keep);
            self.pushed_back = combined;
            result
        };

        trace!(
            taken = take,
            pushed_back = self.pushed_back.len(),
            remaining = self.remaining,
            "push-back parse"
        );
        result.map(drop)
    }

    /// The unit grows by `len` bytes that will arrive in a later frame.
    pub fn more_data(&mut self, len: usize) {
        self.remaining += len;
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn pushed_back(&self) -> &[u8] {
        &self.pushed_back
    }

    /// Every byte of the unit was taken and consumed.
    pub fn is_finished(&self) -> bool {
        self.remaining == 0 && self.pushed_back.is_empty()
    }
}

fn discarded(result: &Result<usize>, unconsumed: usize) -> usize {
    match result {
        Ok(n) => (*n).min(unconsumed),
        Err(_) => 0,
    }
}
