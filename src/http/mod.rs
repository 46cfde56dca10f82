//! HTTP adapter for the reminder engine.
//!
//! A thin axum layer over the store, the sweep, and the monitor
//! registry. Carries no algorithmic weight: validation and all state
//! transitions live in the store and detector.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::detector::AlertWindow;
use crate::monitor::registry::MonitorRegistry;
use crate::store::ReminderStore;
use crate::{AppError, Result};

/// Shared application state handed to every handler.
pub struct AppState {
    /// The reminder store; single owner of all records.
    pub store: Arc<ReminderStore>,
    /// Monitor registry; `None` when background monitors are disabled.
    pub monitors: Option<Arc<MonitorRegistry>>,
    /// Alert window used by the on-demand sweep.
    pub window: AlertWindow,
}

/// Build the API router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/reminders",
            get(handlers::list_reminders).post(handlers::create_reminder),
        )
        .route(
            "/api/reminders/{id}",
            get(handlers::get_reminder)
                .put(handlers::update_reminder)
                .delete(handlers::delete_reminder),
        )
        .route(
            "/api/reminders/{id}/complete",
            post(handlers::complete_reminder),
        )
        .route("/api/check-alerts", get(handlers::check_alerts))
        .route("/api/stats", get(handlers::stats))
        .with_state(state)
}

/// Serve the API on `port` until the token is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the listener fails to bind, or
/// `AppError::Io` if the server errors while running.
pub async fn serve(state: Arc<AppState>, port: u16, ct: CancellationToken) -> Result<()> {
    let bind = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind HTTP on {bind}: {err}")))?;

    info!(%bind, "starting HTTP API");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            ct.cancelled().await;
        })
        .await
        .map_err(|err| AppError::Io(format!("HTTP server error: {err}")))?;

    info!("HTTP API shut down");
    Ok(())
}
