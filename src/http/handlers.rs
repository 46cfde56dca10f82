//! Request handlers and error mapping for the JSON API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::detector::DueAlert;
use crate::models::{CreateReminder, Reminder, ReminderStats, UpdateReminder};
use crate::AppError;

use super::AppState;

/// Wrapper mapping [`AppError`] onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// `GET /api/health`: liveness plus current reminder count.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "reminders_count": state.store.len().await,
    }))
}

/// `GET /api/reminders`: all reminders, ascending by scheduled time.
pub async fn list_reminders(State(state): State<Arc<AppState>>) -> Json<Vec<Reminder>> {
    Json(state.store.list().await)
}

/// `POST /api/reminders`: create a reminder and start its monitor.
pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReminder>,
) -> Result<(StatusCode, Json<Reminder>), ApiError> {
    let reminder = state.store.create(req).await?;
    if let Some(monitors) = &state.monitors {
        monitors.watch(&reminder.id).await;
    }
    Ok((StatusCode::CREATED, Json(reminder)))
}

/// `GET /api/reminders/{id}`.
pub async fn get_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Reminder>, ApiError> {
    Ok(Json(state.store.get(&id).await?))
}

/// `PUT /api/reminders/{id}`: partial update of title/description/time.
pub async fn update_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateReminder>,
) -> Result<Json<Reminder>, ApiError> {
    Ok(Json(state.store.update(&id, req).await?))
}

/// `DELETE /api/reminders/{id}`: remove the reminder and cancel its monitor.
pub async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete(&id).await?;
    if let Some(monitors) = &state.monitors {
        monitors.stop(&id).await;
    }
    Ok(Json(json!({
        "success": true,
        "message": "Reminder deleted",
    })))
}

/// `POST /api/reminders/{id}/complete`: mark done and cancel its monitor.
pub async fn complete_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Reminder>, ApiError> {
    let reminder = state.store.complete(&id).await?;
    if let Some(monitors) = &state.monitors {
        monitors.stop(&id).await;
    }
    Ok(Json(reminder))
}

/// `GET /api/check-alerts`: on-demand sweep over all reminders.
pub async fn check_alerts(
    State(state): State<Arc<AppState>>,
) -> Json<HashMap<String, DueAlert>> {
    Json(state.store.check_alerts(Utc::now(), state.window).await)
}

/// `GET /api/stats`: aggregate counts.
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<ReminderStats> {
    Json(state.store.stats().await)
}
