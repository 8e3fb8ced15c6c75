//! Protocol error types
//!
//! Errors that can occur when encoding or decoding framed event batches.

use thiserror::Error;

/// Errors that can occur during frame codec operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame payload is too short to contain required fields
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    /// Frame exceeds the maximum allowed size
    #[error("frame size {size} exceeds limit {limit}")]
    FrameTooLarge { size: usize, limit: usize },

    /// A field does not fit in its declared length representation
    #[error("field too long: {field} is {actual} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        actual: usize,
        max: usize,
    },

    /// Credentials field is not valid UTF-8
    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },
}

impl ProtocolError {
    /// Create a frame too short error
    #[inline]
    pub fn too_short(expected: usize, actual: usize) -> Self {
        Self::FrameTooShort { expected, actual }
    }

    /// Create a frame too large error
    #[inline]
    pub fn too_large(size: usize, limit: usize) -> Self {
        Self::FrameTooLarge { size, limit }
    }

    /// Create a field too long error
    #[inline]
    pub fn field_too_long(field: &'static str, actual: usize, max: usize) -> Self {
        Self::FieldTooLong { field, actual, max }
    }

    /// Create an invalid UTF-8 error for a named field
    #[inline]
    pub fn invalid_utf8(field: &'static str) -> Self {
        Self::InvalidUtf8 { field }
    }
}
