//! Stream definition model
//!
//! Serde model of the JSON definitions publishers register. Field names are
//! camelCase on the wire. Parsing is strict about the stream name; the rest
//! is structural metadata the harness only stores.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::Result;

/// Attribute value types allowed in a stream definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Int,
    Long,
    Float,
    Double,
    Bool,
}

/// A named, typed attribute within a stream definition
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,

    /// Attribute value type
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
}

/// Parsed structural definition of an event stream
///
/// # Example
///
/// ```
/// use faultline_registry::StreamDefinition;
///
/// let definition = StreamDefinition::from_json(
///     r#"{
///         "name": "org.sample.stats",
///         "version": "1.0.0",
///         "payloadData": [{"name": "count", "type": "long"}]
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(definition.key().as_str(), "org.sample.stats:1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDefinition {
    /// Stream name (required, non-empty)
    pub name: String,

    /// Stream version
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Transport-level metadata attributes
    #[serde(default)]
    pub meta_data: Vec<Attribute>,

    /// Correlation attributes
    #[serde(default)]
    pub correlation_data: Vec<Attribute>,

    /// Event payload attributes
    #[serde(default)]
    pub payload_data: Vec<Attribute>,
}

fn default_version() -> String {
    "1.0.0".to_owned()
}

impl StreamDefinition {
    /// Parse a definition from its JSON source text
    ///
    /// # Errors
    ///
    /// Fails when the source is not valid JSON or the name is empty.
    pub fn from_json(source: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(source)?;
        if definition.name.trim().is_empty() {
            return Err(SchemaError::MissingStreamName);
        }
        Ok(definition)
    }

    /// Identity key for the store
    pub fn key(&self) -> StreamKey {
        StreamKey::new(&self.name, &self.version)
    }
}

/// `name:version` identity of a stream definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey(String);

impl StreamKey {
    /// Build a key from a stream's name and version
    #[inline]
    pub fn new(name: &str, version: &str) -> Self {
        Self(format!("{name}:{version}"))
    }

    /// Key as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StreamKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
