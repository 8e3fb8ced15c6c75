//! Shared received-events counter

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe monotonic counter of received events
///
/// Written by connection tasks, read by the control surface and the restart
/// scheduler. Relaxed ordering is enough here: the one reader that needs an
/// exact boundary (the restart capture) synchronizes by joining the
/// connection tasks first, not through the counter itself.
#[derive(Debug, Default)]
pub struct EventCounter {
    received: AtomicU64,
}

impl EventCounter {
    /// Create a counter at zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            received: AtomicU64::new(0),
        }
    }

    /// Add a batch's worth of events
    #[inline]
    pub fn increment(&self, n: usize) {
        self.received.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Latest value visible to the caller
    #[inline]
    pub fn current(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Reset to exactly zero
    #[inline]
    pub fn reset(&self) {
        self.received.store(0, Ordering::Relaxed);
    }
}
