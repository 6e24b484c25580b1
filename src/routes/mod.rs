//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/api/sessions` - Session lifecycle, sidebar state and transcript
//! - `/api/sessions/{id}/turns` - File upload and chat turns
//! - `/api/health` - Health checks
//! - `/` - Chat page

pub mod chat;
pub mod health;
pub mod sessions;
pub mod ui;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
///
/// Uploads are bounded by the configured maximum upload size instead of
/// axum's default body limit.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let max_upload_bytes = state.config.upload.max_upload_bytes;
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    let api_router = Router::new()
        .merge(sessions::router(state.clone()))
        .merge(chat::router(state.clone()))
        .merge(health::router(state));

    Router::new()
        .merge(api_router)
        .merge(ui::router())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
