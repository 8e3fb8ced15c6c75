//! Server error types

use thiserror::Error;

use faultline_protocol::ProtocolError;
use faultline_registry::SchemaError;

/// Errors from receiver lifecycle operations
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// Failed to bind the listening socket
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// `start()` called while the receiver is not stopped
    #[error("receiver is already running")]
    AlreadyRunning,

    /// I/O error on an accepted connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame decoding error that tears down a connection
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ReceiverError {
    /// Create a bind error
    #[inline]
    pub fn bind(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            address: address.into(),
            source,
        }
    }
}

/// Errors surfaced by the control surface
#[derive(Debug, Error)]
pub enum ControlError {
    /// Port 0 cannot be started or scheduled against: a restart must be
    /// able to rebind the same concrete port
    #[error("invalid port {port}")]
    InvalidPort { port: u16 },

    /// A scheduled restart is still outstanding
    #[error("a restart is already in progress")]
    RestartInProgress,

    /// No restart has captured a count yet
    #[error("no restart has completed a capture yet")]
    RestartNotCompleted,

    /// Receiver operation failed
    #[error(transparent)]
    Receiver(#[from] ReceiverError),

    /// Stream definition registration failed
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
