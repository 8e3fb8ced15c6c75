//! Control surface
//!
//! [`TestServer`] wires the counter, receiver, restart scheduler, and
//! stream registry together behind the handful of operations a publisher
//! test drives. It validates parameters and delegates; the components do
//! the work.

use std::sync::Arc;
use std::time::Duration;

use faultline_registry::{StreamKey, StreamRegistry};

use crate::auth::{AcceptAll, Authenticator};
use crate::config::ReceiverConfig;
use crate::counter::EventCounter;
use crate::error::ControlError;
use crate::metrics::MetricsSnapshot;
use crate::receiver::{BatchHandler, EventReceiver, LifecycleState};
use crate::restart::{RestartPlan, RestartScheduler};

/// Controllable in-process event receiver for publisher resilience tests
pub struct TestServer {
    counter: Arc<EventCounter>,
    receiver: EventReceiver,
    scheduler: RestartScheduler,
    registry: StreamRegistry,
}

impl Default for TestServer {
    fn default() -> Self {
        Self::new(ReceiverConfig::default())
    }
}

impl TestServer {
    /// Create a harness with the accept-all authenticator
    pub fn new(config: ReceiverConfig) -> Self {
        Self::with_authenticator(config, Arc::new(AcceptAll))
    }

    /// Create a harness with a custom authenticator
    pub fn with_authenticator(
        config: ReceiverConfig,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let counter = Arc::new(EventCounter::new());
        let handler: Arc<dyn BatchHandler> = counter.clone();
        let receiver = EventReceiver::new(config, authenticator, handler);
        let scheduler = RestartScheduler::new(receiver.clone(), Arc::clone(&counter));

        Self {
            counter,
            receiver,
            scheduler,
            registry: StreamRegistry::new(),
        }
    }

    /// Start the receiver on `port`
    ///
    /// # Errors
    ///
    /// Rejects port 0; otherwise surfaces bind and already-running errors
    /// from the receiver.
    pub async fn start(&self, port: u16) -> Result<(), ControlError> {
        validate_port(port)?;
        self.receiver.start(port).await?;
        Ok(())
    }

    /// Stop the receiver; no-op when already stopped
    pub async fn stop(&self) {
        self.receiver.stop().await;
    }

    /// Register a stream definition from JSON source text
    ///
    /// # Errors
    ///
    /// Propagates parse failures and the store's duplicate rejection.
    pub fn add_stream_definition(&self, source: &str) -> Result<StreamKey, ControlError> {
        Ok(self.registry.register(source)?)
    }

    /// Number of events received since the last reset
    pub fn events_received(&self) -> u64 {
        self.counter.current()
    }

    /// Reset the received-events count to zero
    pub fn reset_received_events(&self) {
        self.counter.reset();
    }

    /// Schedule a stop-then-start cycle
    ///
    /// The receiver stops after `stop_delay`, the count at that moment is
    /// captured, and the receiver rebinds `port` after a further
    /// `start_delay`.
    ///
    /// # Errors
    ///
    /// Rejects port 0 and overlapping schedules.
    pub fn schedule_restart(
        &self,
        port: u16,
        stop_delay: Duration,
        start_delay: Duration,
    ) -> Result<(), ControlError> {
        validate_port(port)?;
        self.scheduler
            .schedule(RestartPlan::new(port, stop_delay, start_delay))
    }

    /// Events counted at the most recent restart's stop boundary
    ///
    /// # Errors
    ///
    /// [`ControlError::RestartNotCompleted`] until a scheduled stop has
    /// executed its capture.
    pub fn events_before_last_restart(&self) -> Result<u64, ControlError> {
        self.scheduler.count_at_last_restart()
    }

    /// Cancel a scheduled restart that has not begun disrupting yet
    pub fn cancel_restart(&self) {
        self.scheduler.cancel();
    }

    /// Wait for the outstanding restart cycle to finish
    pub async fn wait_for_restart(&self) {
        self.scheduler.wait().await;
    }

    /// Most recent failed restart attempt, if any
    pub fn last_restart_failure(&self) -> Option<String> {
        self.scheduler.last_failure()
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.receiver.state()
    }

    /// Receiver metrics snapshot
    pub fn metrics(&self) -> MetricsSnapshot {
        self.receiver.metrics().snapshot()
    }

    /// The stream registry (and, through it, the definition store)
    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }
}

fn validate_port(port: u16) -> Result<(), ControlError> {
    if port == 0 {
        return Err(ControlError::InvalidPort { port });
    }
    Ok(())
}
