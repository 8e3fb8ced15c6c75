//! Faultline Server - controllable in-process event receiver
//!
//! A test server for validating that event publishers tolerate receiver
//! unavailability. It accepts framed event batches over TCP, counts them,
//! and can disrupt its own lifecycle on a schedule: stop after a delay,
//! capture the count at the moment the listener closed, wait, restart.
//!
//! # Components
//!
//! - [`EventCounter`] - shared received-events counter
//! - [`EventReceiver`] - listener ownership and the Stopped/Starting/Running
//!   lifecycle
//! - [`RestartScheduler`] - supervised stop-then-start background task
//! - [`TestServer`] - the control surface a publisher test drives
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use faultline_server::TestServer;
//!
//! let server = TestServer::default();
//! server.start(7711).await?;
//!
//! // Publisher under test delivers batches...
//! assert_eq!(server.events_received(), 3);
//!
//! // Disrupt: stop after 100ms, restart 100ms later
//! server.schedule_restart(7711, Duration::from_millis(100), Duration::from_millis(100))?;
//! server.wait_for_restart().await;
//!
//! assert_eq!(server.events_before_last_restart()?, 3);
//! ```
//!
//! # Determinism
//!
//! The restart task captures the counter only after `stop()` has returned,
//! and `stop()` does not return until the accept loop and every connection
//! task have exited. The captured value is therefore exactly the number of
//! events accepted before the listener closed - not an eventually-consistent
//! approximation.

mod auth;
mod config;
mod counter;
mod error;
mod harness;
mod metrics;
mod receiver;
mod restart;

pub use auth::{AcceptAll, Authenticator, RejectAll};
pub use config::ReceiverConfig;
pub use counter::EventCounter;
pub use error::{ControlError, ReceiverError};
pub use harness::TestServer;
pub use metrics::{MetricsSnapshot, ReceiverMetrics};
pub use receiver::{BatchHandler, EventReceiver, LifecycleState};
pub use restart::{RestartPlan, RestartScheduler};
