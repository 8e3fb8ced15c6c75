//! Registry error types

use thiserror::Error;

use crate::definition::StreamKey;

/// Errors surfaced when registering a stream definition
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Definition source text is not valid JSON
    #[error("malformed stream definition: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Definition has no stream name
    #[error("stream definition has no name")]
    MissingStreamName,

    /// A definition with the same name and version is already stored
    #[error("duplicate stream definition '{key}'")]
    DuplicateDefinition {
        /// Identity of the conflicting definition
        key: StreamKey,
    },
}

impl SchemaError {
    /// Create a duplicate definition error
    pub fn duplicate(key: StreamKey) -> Self {
        Self::DuplicateDefinition { key }
    }
}
