//! Event receiver
//!
//! Owns the listening socket and the Stopped/Starting/Running lifecycle.
//! The accept loop and per-connection reads run as tokio tasks; `stop()`
//! tears all of them down and does not return until the last connection
//! task has exited, so a count read after `stop()` reflects exactly the
//! events accepted before the listener closed.
//!
//! # Design
//!
//! - **Single-path start**: `start()` is only legal from `Stopped`; both
//!   fresh starts and scheduled restarts go through the same guarded call.
//! - **Tracked connections**: connection tasks run on a `TaskTracker`, not
//!   detached, because the restart scheduler's count capture depends on
//!   `stop()` draining them.
//! - **SO_REUSEADDR**: the listener is built through socket2 so a restart
//!   can rebind the same port without waiting out TIME_WAIT.
//! - **State discipline**: lifecycle state is mutated only by `start()` and
//!   `stop()`; the receive path never touches it.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use parking_lot::Mutex;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use faultline_protocol::{decode_batch, peek_frame_len, EventBatch, LENGTH_PREFIX_SIZE};

use crate::auth::Authenticator;
use crate::config::ReceiverConfig;
use crate::counter::EventCounter;
use crate::error::ReceiverError;
use crate::metrics::ReceiverMetrics;

/// Where the receiver is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No listener bound
    Stopped,
    /// A `start()` call is mid-bind
    Starting,
    /// Accept loop live
    Running,
}

/// Delivery seam for decoded batches
///
/// The receive path hands the batch over and nothing else; in particular it
/// never mutates lifecycle state.
pub trait BatchHandler: Send + Sync {
    /// Called once per accepted batch
    fn on_batch(&self, batch: EventBatch);
}

/// The counter is the harness's terminal handler: a batch becomes its size.
impl BatchHandler for EventCounter {
    fn on_batch(&self, batch: EventBatch) {
        self.increment(batch.len());
    }
}

/// Handles for the live accept loop, torn down by `stop()`
struct Active {
    port: u16,
    cancel: CancellationToken,
    tracker: TaskTracker,
    accept_task: JoinHandle<()>,
}

enum State {
    Stopped,
    Starting,
    Running(Active),
}

impl State {
    fn lifecycle(&self) -> LifecycleState {
        match self {
            Self::Stopped => LifecycleState::Stopped,
            Self::Starting => LifecycleState::Starting,
            Self::Running(_) => LifecycleState::Running,
        }
    }
}

/// TCP event receiver with an explicit lifecycle
///
/// Cheap to clone: clones share the same listener, state, and metrics.
#[derive(Clone)]
pub struct EventReceiver {
    inner: Arc<Inner>,
}

struct Inner {
    config: ReceiverConfig,
    authenticator: Arc<dyn Authenticator>,
    handler: Arc<dyn BatchHandler>,
    metrics: Arc<ReceiverMetrics>,
    state: Mutex<State>,
}

impl EventReceiver {
    /// Create a receiver; nothing is bound until `start()`
    pub fn new(
        config: ReceiverConfig,
        authenticator: Arc<dyn Authenticator>,
        handler: Arc<dyn BatchHandler>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                authenticator,
                handler,
                metrics: Arc::new(ReceiverMetrics::new()),
                state: Mutex::new(State::Stopped),
            }),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.inner.state.lock().lifecycle()
    }

    /// Port of the live listener, if any
    pub fn port(&self) -> Option<u16> {
        match &*self.inner.state.lock() {
            State::Running(active) => Some(active.port),
            _ => None,
        }
    }

    /// Receiver metrics
    pub fn metrics(&self) -> &Arc<ReceiverMetrics> {
        &self.inner.metrics
    }

    /// Bind the listener on `port` and begin accepting batches
    ///
    /// Legal only from `Stopped`; both fresh starts and restarts go through
    /// here, so the state machine has a single recovery path.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::AlreadyRunning`] when not stopped;
    /// [`ReceiverError::Bind`] when the port is unavailable or the address
    /// does not parse. A failed bind leaves the state `Stopped`.
    pub async fn start(&self, port: u16) -> Result<(), ReceiverError> {
        {
            let mut state = self.inner.state.lock();
            match *state {
                State::Stopped => *state = State::Starting,
                _ => return Err(ReceiverError::AlreadyRunning),
            }
        }

        let bind_addr = self.inner.config.bind_address(port);
        let listener = match bind_listener(&bind_addr) {
            Ok(listener) => listener,
            Err(source) => {
                *self.inner.state.lock() = State::Stopped;
                return Err(ReceiverError::bind(bind_addr, source));
            }
        };

        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();

        let inner = Arc::clone(&self.inner);
        let accept_task = tokio::spawn(inner.accept_loop(listener, cancel.clone(), tracker.clone()));

        tracing::info!(address = %bind_addr, "receiver listening");

        *self.inner.state.lock() = State::Running(Active {
            port,
            cancel,
            tracker,
            accept_task,
        });
        Ok(())
    }

    /// Stop accepting and wait for every connection task to exit
    ///
    /// Safe to call when already stopped (no-op). After this returns no
    /// further events will be counted until the next `start()`, and the
    /// port is released.
    pub async fn stop(&self) {
        let active = {
            let mut state = self.inner.state.lock();
            match std::mem::replace(&mut *state, State::Stopped) {
                State::Running(active) => active,
                // A concurrent start() owns the Starting state; leave it be.
                State::Starting => {
                    *state = State::Starting;
                    return;
                }
                State::Stopped => return,
            }
        };

        active.cancel.cancel();
        if active.accept_task.await.is_err() {
            tracing::warn!("accept task panicked during shutdown");
        }

        active.tracker.close();
        if tokio::time::timeout(self.inner.config.drain_timeout, active.tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!("timed out draining connection tasks");
        }

        tracing::info!(port = active.port, "receiver stopped");
    }
}

impl Inner {
    /// Accept loop: runs until cancelled, spawning one tracked task per
    /// connection. The listener drops when this returns, which happens
    /// before `stop()` completes.
    async fn accept_loop(
        self: Arc<Self>,
        listener: TcpListener,
        cancel: CancellationToken,
        tracker: TaskTracker,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = listener.accept() => match result {
                    Ok((stream, peer_addr)) => {
                        self.metrics.connection_opened();

                        let inner = Arc::clone(&self);
                        let conn_cancel = cancel.clone();
                        tracker.spawn(async move {
                            if let Err(e) = inner.handle_connection(stream, peer_addr, conn_cancel).await {
                                // EOF is a normal client disconnect
                                if !matches!(&e, ReceiverError::Io(io_err) if io_err.kind() == io::ErrorKind::UnexpectedEof)
                                {
                                    tracing::debug!(peer = %peer_addr, error = %e, "connection error");
                                }
                            }
                            inner.metrics.connection_closed();
                        });
                    }
                    Err(e) => {
                        // Transient accept errors, keep serving
                        tracing::warn!(error = %e, "accept error");
                    }
                },
            }
        }
    }

    /// Read frames from one connection until EOF or cancellation
    async fn handle_connection(
        &self,
        mut stream: TcpStream,
        peer_addr: SocketAddr,
        cancel: CancellationToken,
    ) -> Result<(), ReceiverError> {
        if self.config.nodelay {
            stream.set_nodelay(true)?;
        }

        let mut buf = BytesMut::with_capacity(self.config.buffer_size);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                read = stream.read_buf(&mut buf) => {
                    if read? == 0 {
                        return Ok(());
                    }
                    self.drain_frames(&mut buf, peer_addr)?;
                }
            }
        }
    }

    /// Decode and dispatch every complete frame currently buffered
    fn drain_frames(&self, buf: &mut BytesMut, peer_addr: SocketAddr) -> Result<(), ReceiverError> {
        loop {
            let payload_len = match peek_frame_len(buf, self.config.max_frame_size) {
                Ok(Some(len)) => len,
                Ok(None) => return Ok(()),
                Err(e) => {
                    // An oversized length prefix cannot be resynced; the
                    // connection is torn down.
                    self.metrics.protocol_error();
                    return Err(e.into());
                }
            };

            let payload = &buf[LENGTH_PREFIX_SIZE..LENGTH_PREFIX_SIZE + payload_len];
            match decode_batch(payload) {
                Ok(batch) => self.dispatch(batch, peer_addr),
                Err(e) => {
                    // A malformed payload is skipped; framing is intact, so
                    // the connection survives.
                    self.metrics.protocol_error();
                    tracing::debug!(peer = %peer_addr, error = %e, "discarding malformed frame");
                }
            }
            buf.advance(LENGTH_PREFIX_SIZE + payload_len);
        }
    }

    /// Authenticate and hand a batch to the handler
    fn dispatch(&self, batch: EventBatch, peer_addr: SocketAddr) {
        if !self.authenticator.authenticate(batch.credentials()) {
            self.metrics.auth_rejection();
            tracing::debug!(peer = %peer_addr, "rejected batch credentials");
            return;
        }

        self.metrics.batch_received();
        tracing::trace!(peer = %peer_addr, events = batch.len(), "batch received");
        self.handler.on_batch(batch);
    }
}

/// Build a listener with SO_REUSEADDR so a scheduled restart can rebind the
/// same port without waiting out TIME_WAIT.
fn bind_listener(bind_addr: &str) -> io::Result<TcpListener> {
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;
    socket.set_nonblocking(true)?;

    TcpListener::from_std(socket.into())
}
