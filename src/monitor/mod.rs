//! Background reminder monitoring.
//!
//! One supervised tokio task per active reminder polls the store at a
//! fixed short interval and emits [`AlertEvent`]s when an alert becomes
//! due. Monitors self-terminate when their reminder vanishes or
//! completes; the [`registry::MonitorRegistry`] additionally tracks the
//! task handles so deletion and shutdown can cancel them eagerly.

pub mod consumer;
pub mod registry;
pub mod watcher;

use crate::detector::DueAlert;

/// Events emitted by reminder monitors for consumer handling.
#[derive(Debug, Clone)]
pub enum AlertEvent {
    /// A reminder's alert became due on a monitor tick.
    Due(DueAlert),
}
