use axum::{routing::get, Json, Router};

use crate::models::DesignStyleInfo;
use crate::style::DesignStyle;

pub fn router() -> Router {
    Router::new()
        .route("/api/room-decorator/styles", get(list_styles))
        .route("/api/room-decorator/styles/details", get(list_style_details))
}

/// GET /api/room-decorator/styles - display names only
async fn list_styles() -> Json<Vec<&'static str>> {
    Json(DesignStyle::ALL.iter().map(|s| s.display_name()).collect())
}

/// GET /api/room-decorator/styles/details
async fn list_style_details() -> Json<Vec<DesignStyleInfo>> {
    Json(
        DesignStyle::ALL
            .iter()
            .map(|s| DesignStyleInfo {
                name: s.display_name().to_string(),
                description: s.description().to_string(),
            })
            .collect(),
    )
}
