//! Stream registry
//!
//! Thin delegation wrapper over the definition store. The backing store is
//! constructed lazily, exactly once, on first use; concurrent first calls
//! all observe the same store.

use std::sync::{Arc, OnceLock};

use crate::definition::{StreamDefinition, StreamKey};
use crate::store::InMemoryDefinitionStore;
use crate::Result;

/// Lazily-initialized registry of stream definitions
#[derive(Debug, Default)]
pub struct StreamRegistry {
    store: OnceLock<Arc<InMemoryDefinitionStore>>,
}

impl StreamRegistry {
    /// Create a registry; the backing store is not built until first use
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backing store, constructed on first call
    pub fn store(&self) -> &Arc<InMemoryDefinitionStore> {
        self.store
            .get_or_init(|| Arc::new(InMemoryDefinitionStore::new()))
    }

    /// Parse a definition from JSON source text and forward it to the store
    ///
    /// # Errors
    ///
    /// Propagates parse errors and the store's duplicate rejection
    /// unchanged.
    pub fn register(&self, source: &str) -> Result<StreamKey> {
        let definition = StreamDefinition::from_json(source)?;
        let key = self.store().save(definition)?;
        tracing::info!(stream = %key, "stream definition registered");
        Ok(key)
    }
}
