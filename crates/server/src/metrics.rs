//! Receiver metrics
//!
//! Side counters for observing receiver behavior in tests. The
//! received-events count lives in [`crate::EventCounter`]; these track the
//! paths around it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for the receiver's accept and dispatch paths
#[derive(Debug, Default)]
pub struct ReceiverMetrics {
    /// Currently active connections
    pub connections_active: AtomicU64,

    /// Total connections accepted
    pub connections_total: AtomicU64,

    /// Batches accepted and dispatched to the handler
    pub batches_received: AtomicU64,

    /// Batches dropped by the authenticator
    pub auth_rejections: AtomicU64,

    /// Malformed or oversized frames
    pub protocol_errors: AtomicU64,
}

impl ReceiverMetrics {
    /// Create a new metrics instance
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connections_active: AtomicU64::new(0),
            connections_total: AtomicU64::new(0),
            batches_received: AtomicU64::new(0),
            auth_rejections: AtomicU64::new(0),
            protocol_errors: AtomicU64::new(0),
        }
    }

    /// Increment active connections
    #[inline]
    pub fn connection_opened(&self) {
        self.connections_active.fetch_add(1, Ordering::Relaxed);
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement active connections
    #[inline]
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a dispatched batch
    #[inline]
    pub fn batch_received(&self) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch dropped by the authenticator
    #[inline]
    pub fn auth_rejection(&self) {
        self.auth_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a malformed or oversized frame
    #[inline]
    pub fn protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_total: self.connections_total.load(Ordering::Relaxed),
            batches_received: self.batches_received.load(Ordering::Relaxed),
            auth_rejections: self.auth_rejections.load(Ordering::Relaxed),
            protocol_errors: self.protocol_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of receiver metrics
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub connections_active: u64,
    pub connections_total: u64,
    pub batches_received: u64,
    pub auth_rejections: u64,
    pub protocol_errors: u64,
}
