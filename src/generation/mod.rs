//! Decorated image generation.
//!
//! Generators take the original photo and a text prompt and return the new
//! image base64-encoded. Text-only backends (DALL-E) ignore the photo.

pub mod openai;
pub mod prompt;
pub mod stability;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, ImageProvider};
use crate::types::AppResult;

pub use openai::OpenAIImageGenerator;
pub use stability::StabilityImageGenerator;

/// 1×1 transparent PNG returned when no real image could be produced
pub const PLACEHOLDER_IMAGE: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Produce a decorated image for `prompt`, returned as base64
    async fn generate(&self, original_image: &[u8], prompt: &str) -> AppResult<String>;
}

/// Build the generator selected by `IMAGE_PROVIDER`
pub fn from_config(config: &Config, client: reqwest::Client) -> Arc<dyn ImageGenerator> {
    match config.generation.provider {
        ImageProvider::OpenAI => Arc::new(OpenAIImageGenerator::new(client, &config.openai)),
        ImageProvider::Stability => Arc::new(StabilityImageGenerator::new(client, &config.stability)),
    }
}
