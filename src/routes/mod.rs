//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/api/room-decorator/decorate` - Multipart upload, analysis and generation
//! - `/api/room-decorator/decorate-json` - Same pipeline with a base64 image
//! - `/api/room-decorator/analyze` - Room analysis only
//! - `/api/room-decorator/options/{id}/regenerate` - Refresh a single option
//! - `/api/room-decorator/styles` - Available design styles
//! - `/api/room-decorator/health`, `/api/health` - Health checks

pub mod decorate;
pub mod health;
pub mod styles;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
///
/// Uploads larger than `MAX_UPLOAD_BYTES` are rejected with 413 before any
/// handler runs.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let max_upload_bytes = state.config.server.max_upload_bytes;
    let allowed_origins = state.config.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .merge(decorate::router(state.clone()))
        .merge(health::router(state))
        .merge(styles::router());

    apply_cors(api_router, &allowed_origins)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}
