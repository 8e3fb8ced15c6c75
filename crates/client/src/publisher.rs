//! TCP test publisher
//!
//! Sends length-prefixed batch frames to a receiver.

use std::io;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use faultline_protocol::{encode_batch, Credentials, EventBatch, ProtocolError};

/// Errors from the test publisher
#[derive(Debug, Error)]
pub enum PublishError {
    /// Connection or write failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Batch could not be encoded
    #[error("encode error: {0}")]
    Encode(#[from] ProtocolError),
}

/// Simple TCP publisher for delivering batches to the harness
///
/// # Example
///
/// ```ignore
/// use faultline_client::{Credentials, EventBatch, TestPublisher};
///
/// let batch = EventBatch::from_payloads(
///     Credentials::new("publisher", "secret"),
///     vec![&b"event-1"[..], &b"event-2"[..]],
/// );
///
/// let mut publisher = TestPublisher::connect("127.0.0.1:7711").await?;
/// publisher.send(&batch).await?;
/// publisher.close().await?;
/// ```
pub struct TestPublisher {
    stream: TcpStream,
}

impl TestPublisher {
    /// Connect to a receiver
    ///
    /// # Errors
    ///
    /// Returns the connect error unchanged - a refused connection is a
    /// result tests assert on, not a condition to retry.
    pub async fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Send one batch, frame prefix included
    ///
    /// # Errors
    ///
    /// Returns encode or write failures.
    pub async fn send(&mut self, batch: &EventBatch) -> Result<(), PublishError> {
        let frame = encode_batch(batch)?;
        self.stream.write_all(&frame).await?;
        Ok(())
    }

    /// Send raw bytes under a length prefix, for malformed-frame tests
    ///
    /// # Errors
    ///
    /// Returns write failures.
    pub async fn send_raw(&mut self, payload: &[u8]) -> io::Result<()> {
        let len = payload.len() as u32;
        self.stream.write_all(&len.to_be_bytes()).await?;
        self.stream.write_all(payload).await?;
        Ok(())
    }

    /// Flush the stream
    ///
    /// # Errors
    ///
    /// Returns flush failures.
    pub async fn flush(&mut self) -> io::Result<()> {
        self.stream.flush().await
    }

    /// Close the connection gracefully
    ///
    /// # Errors
    ///
    /// Returns shutdown failures.
    pub async fn close(mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }

    /// Local address of the connection
    ///
    /// # Errors
    ///
    /// Returns the socket error unchanged.
    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.stream.local_addr()
    }
}

/// Build a batch of `count` identically-sized test events
///
/// Convenience for tests that only care about event counts.
pub fn test_batch(count: usize) -> EventBatch {
    let payloads = (0..count).map(|i| format!("event-{i}").into_bytes());
    EventBatch::from_payloads(Credentials::new("publisher", "secret"), payloads)
}
