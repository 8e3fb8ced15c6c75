//! In-memory stream definition store
//!
//! The keyed store the registry delegates to. Duplicate registrations are
//! rejected so a double registration is a deterministic test signal rather
//! than a silent overwrite.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::definition::{StreamDefinition, StreamKey};
use crate::error::SchemaError;
use crate::Result;

/// Thread-safe keyed store of stream definitions
///
/// # Example
///
/// ```
/// use faultline_registry::{InMemoryDefinitionStore, StreamDefinition};
///
/// let store = InMemoryDefinitionStore::new();
/// let definition = StreamDefinition::from_json(r#"{"name": "s"}"#).unwrap();
///
/// let key = store.save(definition).unwrap();
/// assert!(store.contains(&key));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDefinitionStore {
    inner: RwLock<HashMap<StreamKey, StreamDefinition>>,
}

impl InMemoryDefinitionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a definition under its `name:version` key
    ///
    /// # Errors
    ///
    /// Fails with [`SchemaError::DuplicateDefinition`] when a definition
    /// with the same key is already stored.
    pub fn save(&self, definition: StreamDefinition) -> Result<StreamKey> {
        let key = definition.key();
        let mut inner = self.inner.write();
        if inner.contains_key(&key) {
            return Err(SchemaError::duplicate(key));
        }
        inner.insert(key.clone(), definition);
        Ok(key)
    }

    /// Look up a definition by key
    pub fn get(&self, key: &StreamKey) -> Option<StreamDefinition> {
        self.inner.read().get(key).cloned()
    }

    /// Check whether a definition is stored under `key`
    pub fn contains(&self, key: &StreamKey) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Number of stored definitions
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
