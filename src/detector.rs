//! Alert detection: decides when a reminder's notification is newly due.
//!
//! Both invocation styles (the per-reminder background monitor and the
//! on-demand sweep) funnel through [`advance`], a single check-and-mark
//! transition over the unified lifecycle
//! `Pending → Alerted → Triggered → Completed`. Callers must hold the
//! store lock across the call so that two concurrent checks can never
//! both observe "not yet alerted" and double-deliver.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Reminder;

/// Classification of a newly due alert.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// The scheduled time is still ahead; this is the lead-time warning.
    Alert,
    /// The scheduled time has already passed.
    Triggered,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => f.write_str("alert"),
            Self::Triggered => f.write_str("triggered"),
        }
    }
}

/// Due-alert descriptor reported to callers, serialized for the sweep
/// endpoint as `{type, reminder, time_left}`.
#[derive(Debug, Clone, Serialize)]
pub struct DueAlert {
    /// Alert classification.
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Snapshot of the reminder at delivery time, flags already updated.
    pub reminder: Reminder,
    /// Whole seconds until the scheduled time, clamped at zero.
    pub time_left: i64,
}

/// Detection window: how far ahead an alert fires and how far past due
/// an alerted reminder may linger before it counts as triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertWindow {
    lead_ms: i64,
    grace_ms: i64,
}

impl AlertWindow {
    /// Build a window from whole-second bounds.
    #[must_use]
    pub fn new(lead_seconds: i64, grace_seconds: i64) -> Self {
        Self {
            lead_ms: lead_seconds.saturating_mul(1000),
            grace_ms: grace_seconds.saturating_mul(1000),
        }
    }
}

impl Default for AlertWindow {
    fn default() -> Self {
        Self::new(20, 1)
    }
}

/// Outcome of one detection pass over a single reminder.
#[derive(Debug, Clone)]
pub enum Advance {
    /// Nothing to do: completed, already resolved, or not yet due.
    Unchanged,
    /// The alert is newly due; flags were set and the alert must be
    /// reported to the caller exactly once.
    Due(DueAlert),
    /// An already-alerted reminder passed its grace window and was
    /// marked triggered. Audit-only; nothing is reported.
    Overdue,
}

/// Run one check-and-mark step for `reminder` at `now`.
///
/// Transitions (first match wins):
/// 1. Completed reminders never advance.
/// 2. Not yet alerted and `time_left ≤ lead`: deliver the alert. It is
///    classified [`AlertKind::Triggered`] when the scheduled time has
///    already passed (also setting the `triggered` flag), otherwise
///    [`AlertKind::Alert`]. `alert_sent` is set, so a repeat pass is a
///    no-op until the scheduled time is edited.
/// 3. Alerted but not yet triggered, and more than `grace` past due:
///    mark triggered.
///
/// The caller is responsible for persisting the mutation when the
/// outcome is not [`Advance::Unchanged`].
pub fn advance(reminder: &mut Reminder, now: DateTime<Utc>, window: AlertWindow) -> Advance {
    if reminder.completed {
        return Advance::Unchanged;
    }

    let time_left_ms = (reminder.scheduled_time - now).num_milliseconds();

    if !reminder.alert_sent && time_left_ms <= window.lead_ms {
        reminder.alert_sent = true;
        reminder.alert_time = Some(now);
        let kind = if time_left_ms <= 0 {
            reminder.triggered = true;
            reminder.trigger_time = Some(now);
            AlertKind::Triggered
        } else {
            AlertKind::Alert
        };
        return Advance::Due(DueAlert {
            kind,
            time_left: (time_left_ms.max(0)) / 1000,
            reminder: reminder.clone(),
        });
    }

    if !reminder.triggered && time_left_ms < -window.grace_ms {
        reminder.triggered = true;
        reminder.trigger_time = Some(now);
        return Advance::Overdue;
    }

    Advance::Unchanged
}
