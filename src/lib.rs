// Room Decorator - AI redecoration variants for uploaded room photos

pub mod config;
pub mod types;
pub mod models;
pub mod style;
pub mod llm;
pub mod analysis;   // Pixel heuristics + vision-model description
pub mod generation; // Image generation backends and prompt text
pub mod decorator;  // Parallel variation fan-out with fallback
pub mod middleware;
pub mod routes;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
