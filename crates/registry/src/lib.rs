//! Faultline Registry - stream definitions for the event receiver harness
//!
//! Publishers register the shape of a stream before sending events for it.
//! This crate provides the JSON definition model, a keyed in-memory store,
//! and [`StreamRegistry`], the lazily-initialized wrapper the control
//! surface delegates registrations to.
//!
//! The harness never validates events against definitions; it stores them so
//! publisher-side registration flows have something real to talk to.

mod definition;
mod error;
mod registry;
mod store;

pub use definition::{Attribute, AttributeType, StreamDefinition, StreamKey};
pub use error::SchemaError;
pub use registry::StreamRegistry;
pub use store::InMemoryDefinitionStore;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod store_test;
