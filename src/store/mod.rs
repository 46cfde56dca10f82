//! Reminder store: the single owner of all reminder records.
//!
//! An in-memory map guarded by one `tokio::sync::Mutex`, shared by the
//! HTTP handlers, the on-demand sweep, and every background monitor.
//! Each mutating operation snapshots the full state to disk before
//! returning (write-through). Snapshot failures are logged and the
//! operation still succeeds from in-memory state, which remains the
//! source of truth.

pub mod snapshot;

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::detector::{advance, Advance, AlertWindow, DueAlert};
use crate::models::{parse_timestamp, CreateReminder, Reminder, ReminderStats, UpdateReminder};
use crate::store::snapshot::SnapshotFile;
use crate::{AppError, Result};

/// Outcome of one background-monitor tick for a single reminder.
#[derive(Debug, Clone)]
pub enum MonitorTick {
    /// The reminder's alert is newly due.
    Due(DueAlert),
    /// Nothing to report this tick; keep polling.
    Idle,
    /// The reminder no longer exists or is completed; the monitor
    /// should terminate its loop.
    Stop,
}

struct StoreInner {
    reminders: HashMap<String, Reminder>,
    next_id: u64,
}

/// Concurrency-safe registry of reminders with durable snapshotting.
pub struct ReminderStore {
    inner: Mutex<StoreInner>,
    snapshot: SnapshotFile,
}

impl ReminderStore {
    /// Open the store backed by the snapshot file at `path`, loading any
    /// prior state. A missing or corrupt snapshot starts the store empty
    /// with the counter reset to 1.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the snapshot directory cannot be created.
    pub fn open(path: PathBuf) -> Result<Self> {
        let snapshot = SnapshotFile::open(path)?;
        let loaded = snapshot.load_or_default();
        Ok(Self {
            inner: Mutex::new(StoreInner {
                reminders: loaded.reminders,
                next_id: loaded.next_id,
            }),
            snapshot,
        })
    }

    /// Create a reminder, assigning the next identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when the title is blank after
    /// trimming or the time does not parse.
    pub async fn create(&self, req: CreateReminder) -> Result<Reminder> {
        let title = req.title.trim().to_owned();
        if title.is_empty() {
            return Err(AppError::InvalidInput("title is required".into()));
        }
        if req.time.trim().is_empty() {
            return Err(AppError::InvalidInput("time is required".into()));
        }
        let scheduled_time = parse_timestamp(&req.time)?;

        let mut inner = self.inner.lock().await;
        let id = inner.next_id.to_string();
        inner.next_id += 1;
        let reminder = Reminder::new(id.clone(), title, req.description.trim().to_owned(), scheduled_time);
        inner.reminders.insert(id, reminder.clone());
        self.persist(&inner);

        info!(id = %reminder.id, title = %reminder.title, "created reminder");
        Ok(reminder)
    }

    /// Retrieve a reminder by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the reminder does not exist.
    pub async fn get(&self, id: &str) -> Result<Reminder> {
        let inner = self.inner.lock().await;
        inner
            .reminders
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("reminder not found".into()))
    }

    /// List all reminders, ascending by scheduled time.
    pub async fn list(&self) -> Vec<Reminder> {
        let inner = self.inner.lock().await;
        let mut all: Vec<Reminder> = inner.reminders.values().cloned().collect();
        all.sort_by(|a, b| {
            a.scheduled_time
                .cmp(&b.scheduled_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        all
    }

    /// Update title, description, and/or scheduled time. Editing the
    /// scheduled time clears `alert_sent` so the reminder can alert
    /// again for the new time; editing anything else leaves the alert
    /// flags untouched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id, or
    /// `AppError::InvalidInput` for a blank title or unparsable time.
    /// Invalid input leaves the reminder unchanged.
    pub async fn update(&self, id: &str, req: UpdateReminder) -> Result<Reminder> {
        let mut inner = self.inner.lock().await;
        if !inner.reminders.contains_key(id) {
            return Err(AppError::NotFound("reminder not found".into()));
        }

        // Validate everything before touching the record.
        let new_time = req.time.as_deref().map(parse_timestamp).transpose()?;
        let new_title = match req.title {
            Some(raw) => {
                let trimmed = raw.trim().to_owned();
                if trimmed.is_empty() {
                    return Err(AppError::InvalidInput("title is required".into()));
                }
                Some(trimmed)
            }
            None => None,
        };

        let Some(reminder) = inner.reminders.get_mut(id) else {
            return Err(AppError::NotFound("reminder not found".into()));
        };
        if let Some(title) = new_title {
            reminder.title = title;
        }
        if let Some(description) = req.description {
            reminder.description = description.trim().to_owned();
        }
        if let Some(scheduled_time) = new_time {
            reminder.scheduled_time = scheduled_time;
            reminder.alert_sent = false;
        }
        reminder.updated_at = Some(Utc::now());
        let updated = reminder.clone();
        self.persist(&inner);

        info!(id, "updated reminder");
        Ok(updated)
    }

    /// Mark a reminder as done. Completed reminders are excluded from
    /// all future alerting but remain readable until deleted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the reminder does not exist.
    pub async fn complete(&self, id: &str) -> Result<Reminder> {
        let mut inner = self.inner.lock().await;
        let Some(reminder) = inner.reminders.get_mut(id) else {
            return Err(AppError::NotFound("reminder not found".into()));
        };
        reminder.completed = true;
        reminder.completed_at = Some(Utc::now());
        let completed = reminder.clone();
        self.persist(&inner);

        info!(id, title = %completed.title, "marked reminder complete");
        Ok(completed)
    }

    /// Remove a reminder. The id is never reassigned.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the reminder does not exist.
    pub async fn delete(&self, id: &str) -> Result<Reminder> {
        let mut inner = self.inner.lock().await;
        let Some(removed) = inner.reminders.remove(id) else {
            return Err(AppError::NotFound("reminder not found".into()));
        };
        self.persist(&inner);

        info!(id, title = %removed.title, "deleted reminder");
        Ok(removed)
    }

    /// Aggregate counts over the current state.
    pub async fn stats(&self) -> ReminderStats {
        let inner = self.inner.lock().await;
        let completed = inner.reminders.values().filter(|r| r.completed).count();
        let triggered = inner.reminders.values().filter(|r| r.triggered).count();
        ReminderStats {
            total: inner.reminders.len(),
            upcoming: inner.reminders.len() - completed,
            completed,
            triggered,
        }
    }

    /// Number of reminders currently held.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.reminders.len()
    }

    /// Whether the store holds no reminders.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// On-demand sweep: one pass over all reminders, returning every
    /// newly due alert keyed by reminder id. The whole batch runs under
    /// the store lock and persists at most once.
    pub async fn check_alerts(
        &self,
        now: DateTime<Utc>,
        window: AlertWindow,
    ) -> HashMap<String, DueAlert> {
        let mut inner = self.inner.lock().await;
        let mut due = HashMap::new();
        let mut changed = false;

        for (id, reminder) in &mut inner.reminders {
            match advance(reminder, now, window) {
                Advance::Due(alert) => {
                    info!(
                        id = %id,
                        kind = %alert.kind,
                        time_left = alert.time_left,
                        "alert queued"
                    );
                    due.insert(id.clone(), alert);
                    changed = true;
                }
                Advance::Overdue => changed = true,
                Advance::Unchanged => {}
            }
        }

        if changed {
            self.persist(&inner);
        }
        due
    }

    /// One background-monitor tick for a single reminder. Runs the same
    /// check-and-mark step as the sweep, under the same lock, and tells
    /// the monitor when to stop: deletion and completion are observed
    /// here rather than signalled externally.
    pub async fn poll_monitor(
        &self,
        id: &str,
        now: DateTime<Utc>,
        window: AlertWindow,
    ) -> MonitorTick {
        let mut inner = self.inner.lock().await;
        let Some(reminder) = inner.reminders.get_mut(id) else {
            return MonitorTick::Stop;
        };
        if reminder.completed {
            return MonitorTick::Stop;
        }
        match advance(reminder, now, window) {
            Advance::Due(alert) => {
                self.persist(&inner);
                MonitorTick::Due(alert)
            }
            Advance::Overdue => {
                self.persist(&inner);
                MonitorTick::Idle
            }
            Advance::Unchanged => MonitorTick::Idle,
        }
    }

    /// Write-through snapshot. Failure is logged, not propagated: the
    /// in-memory state remains authoritative and the operation that
    /// triggered the write still succeeds.
    fn persist(&self, inner: &StoreInner) {
        if let Err(err) = self.snapshot.save(&inner.reminders, inner.next_id) {
            error!(path = %self.snapshot.path().display(), %err, "snapshot write failed");
        }
    }
}
