//! Handle registry supervising the per-reminder monitor tasks.
//!
//! Keyed by reminder id so that deletion and completion can cancel the
//! matching task instead of leaving an orphaned loop, and so shutdown
//! can await every monitor. Monitors also self-terminate by observing
//! the store, so a stale handle for an already-finished task is
//! harmless; cancelling it is a no-op.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::detector::AlertWindow;
use crate::store::ReminderStore;

use super::watcher::{MonitorHandle, ReminderMonitor};
use super::AlertEvent;

/// Spawns and tracks one monitor task per active reminder.
pub struct MonitorRegistry {
    store: Arc<ReminderStore>,
    window: AlertWindow,
    poll_interval: Duration,
    event_tx: mpsc::Sender<AlertEvent>,
    /// Parent token; each monitor gets a child so individual cancellation
    /// does not tear down the rest of the pool.
    cancel: CancellationToken,
    handles: Mutex<HashMap<String, MonitorHandle>>,
}

impl MonitorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(
        store: Arc<ReminderStore>,
        window: AlertWindow,
        poll_interval: Duration,
        event_tx: mpsc::Sender<AlertEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            window,
            poll_interval,
            event_tx,
            cancel,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Spawn a monitor for `reminder_id` and track its handle. A
    /// pre-existing monitor for the same id is cancelled and replaced.
    pub async fn watch(&self, reminder_id: &str) {
        let monitor = ReminderMonitor::new(
            reminder_id.to_owned(),
            Arc::clone(&self.store),
            self.window,
            self.poll_interval,
            self.event_tx.clone(),
            self.cancel.child_token(),
        );
        let handle = monitor.spawn();

        let mut handles = self.handles.lock().await;
        if let Some(previous) = handles.insert(reminder_id.to_owned(), handle) {
            previous.await_completion().await;
        }
    }

    /// Cancel and drop the monitor for `reminder_id`, if any. Returns
    /// whether a handle was tracked.
    pub async fn stop(&self, reminder_id: &str) -> bool {
        let handle = self.handles.lock().await.remove(reminder_id);
        match handle {
            Some(handle) => {
                handle.await_completion().await;
                true
            }
            None => false,
        }
    }

    /// Whether a monitor handle is currently tracked for `reminder_id`.
    pub async fn is_watching(&self, reminder_id: &str) -> bool {
        self.handles.lock().await.contains_key(reminder_id)
    }

    /// Number of tracked monitor handles.
    pub async fn active(&self) -> usize {
        self.handles.lock().await.len()
    }

    /// Cancel every monitor and wait for all tasks to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handles: Vec<MonitorHandle> = {
            let mut guard = self.handles.lock().await;
            guard.drain().map(|(_, handle)| handle).collect()
        };
        let count = handles.len();
        for handle in handles {
            handle.await_completion().await;
        }
        info!(count, "monitor registry shut down");
    }
}
