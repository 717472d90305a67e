//! Axum route handlers for the reminder REST API.

use crate::dashboard;
use crate::db::Db;
use crate::error::{ApiError, ApiResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Router;
use medicine_reminder_types::*;
use std::sync::Arc;
use std::time::Instant;

pub struct AppState {
    pub db: Arc<Db>,
    pub start_time: Instant,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", axum::routing::get(dashboard::dashboard))
        .route(
            "/api/reminders",
            axum::routing::get(list_reminders).post(create_reminder),
        )
        .route(
            "/api/reminders/:id",
            axum::routing::patch(update_reminder).delete(delete_reminder),
        )
        .route("/api/status", axum::routing::get(status))
        .with_state(state)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

// GET /api/reminders
pub async fn list_reminders(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Reminder>>> {
    let reminders = state.db.list_reminders().map_err(ApiError::internal)?;
    Ok(Json(reminders))
}

// POST /api/reminders
pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateReminderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Reminder>)> {
    let req = json_body(payload)?;
    let new = req.validate().map_err(ApiError::bad_request)?;
    let reminder = state.db.insert_reminder(&new).map_err(ApiError::internal)?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

// PATCH /api/reminders/:id
pub async fn update_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateReminderRequest>, JsonRejection>,
) -> ApiResult<Json<Reminder>> {
    let req = json_body(payload)?;
    let updated = match req.taken {
        Some(taken) => state.db.set_taken(&id, taken),
        None => state.db.get_reminder(&id),
    }
    .map_err(ApiError::internal)?;

    updated
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Reminder not found"))
}

// DELETE /api/reminders/:id
pub async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    match state.db.delete_reminder(&id) {
        Ok(true) => Ok(Json(MessageBody::new("Reminder deleted"))),
        Ok(false) => Err(ApiError::not_found("Reminder not found")),
        Err(e) => Err(ApiError::internal(e)),
    }
}

// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    let stats = state.db.get_stats().unwrap_or_default();
    Json(ServiceStatus {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        total_reminders: stats.total,
        taken_count: stats.taken,
        pending_count: stats.pending,
    })
}
