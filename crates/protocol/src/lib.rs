//! Faultline Protocol - wire framing for the event receiver harness
//!
//! This crate pins down the transport contract the harness and its test
//! publisher speak: length-prefixed frames, each carrying the publisher's
//! credentials and an ordered sequence of opaque event payloads.
//!
//! # Protocol
//!
//! Each message is framed with a 4-byte big-endian length prefix:
//! ```text
//! [4 bytes: payload length (big-endian)][N bytes: payload]
//! ```
//!
//! The payload layout:
//! ```text
//! [u16: username len][username][u16: password len][password]
//! [u32: event count]
//! repeat per event: [u32: payload len][payload bytes]
//! ```
//!
//! Event payloads are opaque to the harness; it only ever counts them.
//!
//! # Design
//!
//! - **Incremental reads**: [`peek_frame_len`] lets a connection task find
//!   complete frames in a partially filled `BytesMut` without copying.
//! - **Explicit bounds checks**: decoding never indexes past the slice it
//!   was given; every short read is a typed error.

mod batch;
mod error;
mod frame;

pub use batch::{Credentials, Event, EventBatch};
pub use error::ProtocolError;
pub use frame::{decode_batch, encode_batch, peek_frame_len};

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Length prefix size (4 bytes, big-endian u32)
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Maximum frame payload size (16MB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;
