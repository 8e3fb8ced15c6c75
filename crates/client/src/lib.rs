//! Faultline Client - test publisher
//!
//! Minimal publisher used by the harness's own tests: connects to a
//! receiver, frames batches, and pushes them down the socket. Publisher
//! implementations under test bring their own retry and reconnect logic;
//! this one intentionally has none, so tests can observe exactly when
//! delivery fails.

mod publisher;

pub use publisher::{test_batch, PublishError, TestPublisher};

// Re-export batch construction so tests only need one import
pub use faultline_protocol::{Credentials, Event, EventBatch};
