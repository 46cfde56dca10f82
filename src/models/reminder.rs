//! Reminder model, request types, and timestamp normalization.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Derived lifecycle state for a reminder.
///
/// A reminder advances `Pending → Alerted → Triggered`, with `Completed`
/// reachable from any state. The state is derived from the persisted
/// flags rather than stored separately, so the snapshot format stays a
/// faithful record of what happened and when.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    /// Scheduled time not yet inside the alert window.
    Pending,
    /// Due-alert delivered; scheduled time not yet past the grace window.
    Alerted,
    /// Scheduled time has passed.
    Triggered,
    /// Explicitly marked done; terminal for alerting purposes.
    Completed,
}

/// Reminder domain entity persisted in the JSON snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reminder {
    /// Unique identifier; monotonically assigned, never reused.
    pub id: String,
    /// Non-empty display title.
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: String,
    /// Scheduled time, normalized to UTC at the parsing boundary.
    #[serde(rename = "time")]
    pub scheduled_time: DateTime<Utc>,
    /// Creation timestamp; set by the store.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp; set by the store.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// When the reminder was marked done.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// True once the scheduled time has passed.
    #[serde(default)]
    pub triggered: bool,
    /// True once the due-alert has been emitted for the current
    /// scheduled time. Cleared only by editing the scheduled time.
    #[serde(default)]
    pub alert_sent: bool,
    /// True once explicitly marked done.
    #[serde(default)]
    pub completed: bool,
    /// When `alert_sent` was set, for audit.
    #[serde(default)]
    pub alert_time: Option<DateTime<Utc>>,
    /// When `triggered` was set, for audit.
    #[serde(default)]
    pub trigger_time: Option<DateTime<Utc>>,
}

impl Reminder {
    /// Construct a new reminder with default flags.
    #[must_use]
    pub fn new(id: String, title: String, description: String, scheduled_time: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            description,
            scheduled_time,
            created_at: Utc::now(),
            updated_at: None,
            completed_at: None,
            triggered: false,
            alert_sent: false,
            completed: false,
            alert_time: None,
            trigger_time: None,
        }
    }

    /// Current derived lifecycle state.
    #[must_use]
    pub fn state(&self) -> ReminderState {
        if self.completed {
            ReminderState::Completed
        } else if self.triggered {
            ReminderState::Triggered
        } else if self.alert_sent {
            ReminderState::Alerted
        } else {
            ReminderState::Pending
        }
    }
}

/// Request body for creating a reminder.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReminder {
    /// Reminder title; must be non-empty after trimming. Defaulted so a
    /// missing field surfaces as an input-validation error, not a
    /// deserialization failure.
    #[serde(default)]
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Scheduled time as an ISO-8601 string; naive times are read as UTC.
    #[serde(default)]
    pub time: String,
}

/// Request body for updating a reminder. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReminder {
    /// New title, if changing.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New scheduled time, if changing. Clears `alert_sent`.
    pub time: Option<String>,
}

/// Aggregate counts over the current store contents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderStats {
    /// All reminders, any state.
    pub total: usize,
    /// Not yet completed.
    pub upcoming: usize,
    /// Marked done.
    pub completed: usize,
    /// Scheduled time has passed.
    pub triggered: usize,
}

/// Parse an ISO-8601 timestamp, normalizing to UTC.
///
/// Accepts RFC 3339 (`2026-01-02T03:04:05Z`, `...+02:00`) as well as
/// naive timestamps without an offset (`2026-01-02T03:04:05`,
/// `2026-01-02T03:04`), which are interpreted as UTC. All timezone
/// handling happens here; the core never inspects timestamp strings.
///
/// # Errors
///
/// Returns `AppError::InvalidInput` when the string matches none of the
/// accepted formats.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Ok(aware.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(AppError::InvalidInput(format!(
        "invalid datetime format: {raw}"
    )))
}
