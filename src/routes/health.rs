use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::models::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub image_provider: String,
    pub vision_configured: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/room-decorator/health", get(health_text))
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_text() -> &'static str {
    "Room Decorator API is running"
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        image_provider: format!("{:?}", state.config.generation.provider).to_lowercase(),
        vision_configured: !state.config.openai.api_key.is_empty(),
    })
}
