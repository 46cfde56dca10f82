//! Per-reminder background monitor task.
//!
//! Each active reminder gets a [`ReminderMonitor`] that polls the store
//! at a fixed interval and runs the detector's check-and-mark step.
//! The loop terminates on its own once the reminder is deleted or
//! completed; the removal condition is re-checked every tick because
//! deletion can happen concurrently with a check.
//!
//! Due alerts are delivered via a `tokio::sync::mpsc` channel so the
//! consumer can react without blocking the monitor.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use crate::detector::AlertWindow;
use crate::store::{MonitorTick, ReminderStore};

use super::AlertEvent;

/// Builder for a per-reminder monitor.
///
/// Call [`spawn`](Self::spawn) to start the background polling task.
pub struct ReminderMonitor {
    reminder_id: String,
    store: Arc<ReminderStore>,
    window: AlertWindow,
    poll_interval: Duration,
    event_tx: mpsc::Sender<AlertEvent>,
    cancel: CancellationToken,
}

impl ReminderMonitor {
    /// Construct a new monitor (does not start the task yet).
    #[must_use]
    pub fn new(
        reminder_id: String,
        store: Arc<ReminderStore>,
        window: AlertWindow,
        poll_interval: Duration,
        event_tx: mpsc::Sender<AlertEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            reminder_id,
            store,
            window,
            poll_interval,
            event_tx,
            cancel,
        }
    }

    /// Spawn the polling task and return a handle for cancelling it.
    #[must_use]
    pub fn spawn(self) -> MonitorHandle {
        let cancel_for_handle = self.cancel.clone();
        let reminder_id = self.reminder_id.clone();

        let task_handle = tokio::spawn(
            Self::run(
                self.reminder_id,
                self.store,
                self.window,
                self.poll_interval,
                self.event_tx,
                self.cancel,
            )
            .instrument(info_span!("reminder_monitor")),
        );

        MonitorHandle {
            reminder_id,
            join_handle: Some(task_handle),
            cancel: cancel_for_handle,
        }
    }

    /// Core polling loop.
    async fn run(
        reminder_id: String,
        store: Arc<ReminderStore>,
        window: AlertWindow,
        poll_interval: Duration,
        event_tx: mpsc::Sender<AlertEvent>,
        cancel: CancellationToken,
    ) {
        debug!(reminder_id, "monitor started");
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(reminder_id, "monitor cancelled");
                    return;
                }
                _ = interval.tick() => {}
            }

            match store.poll_monitor(&reminder_id, Utc::now(), window).await {
                MonitorTick::Stop => {
                    debug!(reminder_id, "reminder gone or completed; monitor stopping");
                    return;
                }
                MonitorTick::Due(alert) => {
                    info!(
                        reminder_id,
                        kind = %alert.kind,
                        time_left = alert.time_left,
                        "alert due"
                    );
                    let _ = event_tx.send(AlertEvent::Due(alert)).await;
                }
                MonitorTick::Idle => {}
            }
        }
    }
}

/// Handle returned from [`ReminderMonitor::spawn`].
pub struct MonitorHandle {
    reminder_id: String,
    /// Task handle for the background polling loop.
    join_handle: Option<JoinHandle<()>>,
    /// Per-monitor cancellation token, cancelled when the handle is dropped.
    cancel: CancellationToken,
}

impl Drop for MonitorHandle {
    /// Cancel the background task when the handle is dropped.
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl MonitorHandle {
    /// The reminder id this handle monitors.
    #[must_use]
    pub fn reminder_id(&self) -> &str {
        &self.reminder_id
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn await_completion(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
    }

    /// Wait for the task to exit without cancelling it first. Used in
    /// tests to observe self-termination on deletion or completion.
    pub async fn join(mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
    }
}
