//! Alert event consumer: structured logging for due alerts.
//!
//! Reads events from the shared `mpsc::Receiver<AlertEvent>` channel and
//! records each delivery. This is the process-local notification sink;
//! callers that want richer delivery channels poll the sweep endpoint.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::AlertEvent;

/// Spawn a background task that reads alert events and logs them.
///
/// The task runs until the `CancellationToken` fires or the `mpsc`
/// channel closes. Returns a `JoinHandle` so the caller can await clean
/// shutdown.
#[must_use]
pub fn spawn_alert_consumer(
    mut rx: mpsc::Receiver<AlertEvent>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                () = cancel.cancelled() => {
                    info!("alert consumer shutting down");
                    break;
                }
                maybe_event = rx.recv() => {
                    if let Some(e) = maybe_event { e } else {
                        info!("alert event channel closed");
                        break;
                    }
                }
            };

            match event {
                AlertEvent::Due(alert) => {
                    info!(
                        id = %alert.reminder.id,
                        title = %alert.reminder.title,
                        kind = %alert.kind,
                        time_left = alert.time_left,
                        "reminder alert delivered"
                    );
                }
            }
        }
    })
}
