//! Receiver configuration

use std::time::Duration;

use serde::Deserialize;

use faultline_protocol::MAX_FRAME_SIZE;

/// Default read buffer capacity per connection (64KB)
const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Default drain timeout for `stop()` (5s)
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Receiver configuration
///
/// The port is not part of the config: it is a per-`start()` argument so a
/// scheduled restart can carry its own port.
///
/// # Example
///
/// ```toml
/// address = "127.0.0.1"
/// buffer_size = 65536
/// nodelay = true
/// drain_timeout = "5s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Bind address as an IP literal. The harness is in-process test
    /// tooling, so it binds loopback unless told otherwise.
    pub address: String,

    /// Read buffer capacity per connection
    pub buffer_size: usize,

    /// Enable TCP_NODELAY on accepted connections
    pub nodelay: bool,

    /// Maximum accepted frame payload size
    pub max_frame_size: usize,

    /// How long `stop()` waits for connection tasks to drain before
    /// giving up with a warning
    #[serde(with = "humantime_serde")]
    pub drain_timeout: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            nodelay: true,
            max_frame_size: MAX_FRAME_SIZE,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

impl ReceiverConfig {
    /// Create a config with a custom bind address
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Socket address string for the given port
    pub fn bind_address(&self, port: u16) -> String {
        format!("{}:{}", self.address, port)
    }

    /// Parse a config from TOML source text
    ///
    /// # Errors
    ///
    /// Returns the TOML deserialization error unchanged.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}
