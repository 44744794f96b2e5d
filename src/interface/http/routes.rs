use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::application::SnapshotServer;

use super::handlers::{health_handler, history_handler, live_handler, AppState};

pub fn create_router(snapshot_server: Arc<SnapshotServer>) -> Router {
    let state = AppState { snapshot_server };

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/live", get(live_handler))
        .route("/api/history", get(history_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
