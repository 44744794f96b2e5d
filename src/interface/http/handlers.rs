use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::application::{ServiceUnavailableError, SnapshotServer};
use crate::domain::{LiveReading, Snapshot};

/// Error body returned by the snapshot endpoints
#[derive(Debug)]
pub struct AppError(ServiceUnavailableError);

impl From<ServiceUnavailableError> for AppError {
    fn from(err: ServiceUnavailableError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub snapshot_server: Arc<SnapshotServer>,
}

/// Handler for GET /api/health
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let status = state.snapshot_server.status();
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "solardash",
            "live_len": status.live_len,
            "history_len": status.history_len,
            "live_cursor": status.live_cursor,
        })),
    )
}

/// Handler for GET /api/live
pub async fn live_handler(State(state): State<AppState>) -> Result<Json<LiveReading>, AppError> {
    state.snapshot_server.get_live().map(Json).map_err(|e| {
        warn!("Live request failed: {}", e);
        AppError::from(e)
    })
}

/// Handler for GET /api/history
///
/// Wrapped in a single-element array, the shape dashboards already consume.
pub async fn history_handler(State(state): State<AppState>) -> Result<Json<Vec<Snapshot>>, AppError> {
    let snapshot = state.snapshot_server.get_history().map_err(|e| {
        warn!("History request failed: {}", e);
        AppError::from(e)
    })?;
    Ok(Json(vec![snapshot]))
}
