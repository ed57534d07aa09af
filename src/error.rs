//! Error types for header block decoding.

use thiserror::Error;

use crate::frame::error_code;

/// Result type alias using [`H2Error`].
pub type Result<T> = std::result::Result<T, H2Error>;

/// HPACK decoding errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HpackError {
    #[error("Integer overflow")]
    IntegerOverflow,

    /// The header block ended in the middle of a field representation.
    #[error("Header block truncated ({0} bytes left undecoded)")]
    Truncated(usize),

    #[error("HPACK decode error: {0}")]
    Decode(String),
}

/// Errors raised while assembling a header block.
///
/// Every variant maps to the HTTP/2 error code the caller should put on the
/// wire in its RST_STREAM or GOAWAY frame (see [`H2Error::error_code`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum H2Error {
    /// The HPACK decoder rejected the block. Connection error.
    #[error("Compression error: {0}")]
    Compression(#[from] HpackError),

    #[error("Malformed header: empty header name")]
    EmptyHeaderName,

    #[error("Malformed header: pseudo-header {name} after regular header")]
    PseudoHeaderOrder { name: String },

    #[error("Invalid padding length in HEADERS frame ({pad_length} bytes, {available} available)")]
    InvalidPadding { pad_length: usize, available: usize },

    #[error("HEADERS frame too short for its flags ({length} bytes, need {needed})")]
    FrameSize { length: u32, needed: usize },

    #[error("Header block too large ({size} bytes, max {max})")]
    HeaderBlockTooLarge { size: usize, max: usize },

    #[error("{0}")]
    UnexpectedFrame(String),
}

impl H2Error {
    /// HTTP/2 error code for this failure (RFC 7540 Section 7).
    pub fn error_code(&self) -> u32 {
        match self {
            H2Error::Compression(_) => error_code::COMPRESSION_ERROR,
            H2Error::FrameSize { .. } => error_code::FRAME_SIZE_ERROR,
            H2Error::HeaderBlockTooLarge { .. } => error_code::ENHANCE_YOUR_CALM,
            H2Error::EmptyHeaderName
            | H2Error::PseudoHeaderOrder { .. }
            | H2Error::InvalidPadding { .. }
            | H2Error::UnexpectedFrame(_) => error_code::PROTOCOL_ERROR,
        }
    }

    /// True for failures in the header fields themselves, as opposed to
    /// framing or compression failures.
    pub fn is_malformed_header(&self) -> bool {
        matches!(self, H2Error::EmptyHeaderName | H2Error::PseudoHeaderOrder { .. })
    }
}

impl From<H2Error> for String {
    fn from(e: H2Error) -> Self {
        e.to_string()
    }
}
