//! Scheduled stop-then-restart
//!
//! One supervised background task per schedule: wait, stop the receiver,
//! capture the counter, wait again, restart. The capture happens strictly
//! after `stop()` returns - and `stop()` waits for every connection task -
//! so the captured value is exactly the number of events accepted before
//! the listener closed.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::counter::EventCounter;
use crate::error::ControlError;
use crate::receiver::EventReceiver;

/// Parameters of a scheduled restart
#[derive(Debug, Clone, Copy)]
pub struct RestartPlan {
    /// Port to rebind after the restart
    pub port: u16,

    /// Delay before stopping the receiver
    pub stop_delay: Duration,

    /// Delay between the stop and the restart
    pub start_delay: Duration,
}

impl RestartPlan {
    /// Create a restart plan
    pub fn new(port: u16, stop_delay: Duration, start_delay: Duration) -> Self {
        Self {
            port,
            stop_delay,
            start_delay,
        }
    }
}

/// Observable results of restart cycles
#[derive(Debug, Default)]
struct Captured {
    /// Count captured at the most recent scheduled stop
    count_at_restart: Option<u64>,

    /// Message of the most recent failed restart attempt
    last_failure: Option<String>,
}

/// Handles for the outstanding restart task
struct ActiveRestart {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Schedules and supervises restart tasks
///
/// At most one restart may be outstanding at a time; overlapping schedules
/// are rejected rather than racing two tasks over the same receiver.
pub struct RestartScheduler {
    receiver: EventReceiver,
    counter: Arc<EventCounter>,
    captured: Arc<Mutex<Captured>>,
    active: Mutex<Option<ActiveRestart>>,
}

impl RestartScheduler {
    /// Create a scheduler for the given receiver and counter
    pub fn new(receiver: EventReceiver, counter: Arc<EventCounter>) -> Self {
        Self {
            receiver,
            counter,
            captured: Arc::new(Mutex::new(Captured::default())),
            active: Mutex::new(None),
        }
    }

    /// Schedule one stop-then-start cycle
    ///
    /// # Errors
    ///
    /// [`ControlError::RestartInProgress`] when a previously scheduled
    /// restart has not finished yet.
    pub fn schedule(&self, plan: RestartPlan) -> Result<(), ControlError> {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|a| !a.task.is_finished()) {
            return Err(ControlError::RestartInProgress);
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_restart(
            plan,
            self.receiver.clone(),
            Arc::clone(&self.counter),
            Arc::clone(&self.captured),
            cancel.clone(),
        ));

        tracing::info!(
            port = plan.port,
            stop_delay_ms = plan.stop_delay.as_millis() as u64,
            start_delay_ms = plan.start_delay.as_millis() as u64,
            "restart scheduled"
        );

        *active = Some(ActiveRestart { cancel, task });
        Ok(())
    }

    /// Cancel an outstanding restart
    ///
    /// Only effective while the task is still waiting out the stop delay:
    /// once the disruption has begun, the cycle runs to completion so the
    /// receiver is never left stopped by a cancel that landed mid-restart.
    pub fn cancel(&self) {
        if let Some(active) = &*self.active.lock() {
            active.cancel.cancel();
        }
    }

    /// Wait for the outstanding restart task to finish, if any
    ///
    /// Consumes the task handle; returns immediately when nothing is
    /// scheduled.
    pub async fn wait(&self) {
        let task = self.active.lock().take().map(|active| active.task);
        if let Some(task) = task {
            if task.await.is_err() {
                tracing::warn!("restart task panicked");
            }
        }
    }

    /// Count captured at the most recent completed stop
    ///
    /// # Errors
    ///
    /// [`ControlError::RestartNotCompleted`] until the first scheduled stop
    /// has executed its capture.
    pub fn count_at_last_restart(&self) -> Result<u64, ControlError> {
        self.captured
            .lock()
            .count_at_restart
            .ok_or(ControlError::RestartNotCompleted)
    }

    /// Message of the most recent failed restart attempt, if any
    pub fn last_failure(&self) -> Option<String> {
        self.captured.lock().last_failure.clone()
    }
}

/// Body of the restart task
async fn run_restart(
    plan: RestartPlan,
    receiver: EventReceiver,
    counter: Arc<EventCounter>,
    captured: Arc<Mutex<Captured>>,
    cancel: CancellationToken,
) {
    // Cancellation window: only before the disruption begins.
    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::info!("scheduled restart cancelled");
            return;
        }
        _ = tokio::time::sleep(plan.stop_delay) => {}
    }

    receiver.stop().await;

    // stop() has drained every connection task, so this is the exact count
    // of events accepted before the listener closed.
    let count = counter.current();
    captured.lock().count_at_restart = Some(count);
    tracing::info!(events = count, "receiver stopped for scheduled restart");

    tokio::time::sleep(plan.start_delay).await;

    match receiver.start(plan.port).await {
        Ok(()) => {
            captured.lock().last_failure = None;
            tracing::info!(port = plan.port, "receiver restarted");
        }
        Err(e) => {
            // Terminal for this attempt only; the receiver stays stopped
            // and the failure is observable through last_failure().
            tracing::error!(error = %e, "scheduled restart failed");
            captured.lock().last_failure = Some(e.to_string());
        }
    }
}
