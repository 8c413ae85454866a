//! Codec error types.
//!
//! Every structural defect a decoder can hit has its own variant so callers
//! and logs see exactly what was wrong with a buffer. The exchange adapter
//! treats all of them as "peer identity absent"; nothing here is fatal.

use thiserror::Error;

/// Errors from encoding or decoding a node identity buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Buffer too small: need {need} bytes, got {got}")]
    MessageTooSmall { need: usize, got: usize },

    #[error("Invalid magic: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic { expected: u32, actual: u32 },

    #[error("Unsupported format version: {version}")]
    UnsupportedVersion { version: u8 },

    #[error("Truncated payload: header declares {declared} bytes, buffer holds {actual}")]
    TruncatedPayload { declared: usize, actual: usize },

    #[error("Checksum mismatch: expected {expected:#010x}, calculated {calculated:#010x}")]
    ChecksumMismatch { expected: u32, calculated: u32 },

    #[error(
        "Bounds check failed: offset {offset} + length {length} exceeds payload size {payload_size}"
    )]
    BoundsCheckFailed {
        offset: usize,
        length: usize,
        payload_size: usize,
    },

    #[error("Field '{field}' is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    #[error("Map '{map}' keys are not sorted strictly ascending")]
    UnsortedMapKeys { map: &'static str },

    #[error("Encoded node too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
