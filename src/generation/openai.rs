// OpenAI image generation (DALL-E)
// API Reference: https://platform.openai.com/docs/api-reference/images/create
//
// DALL-E 3 is text-to-image only, so the original photo reaches it solely
// through the prompt built from the room analysis.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ImageGenerator;
use crate::config::OpenAIConfig;
use crate::llm::openai::describe_api_error;
use crate::types::{AppError, AppResult};

pub struct OpenAIImageGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    size: String,
    quality: String,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u32,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
}

impl OpenAIImageGenerator {
    pub fn new(client: Client, config: &OpenAIConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.image_model.clone(),
            size: config.image_size.clone(),
            quality: config.image_quality.clone(),
        }
    }

    async fn download(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ImageGeneration(format!(
                "Downloading generated image failed ({})",
                status
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageGenerator for OpenAIImageGenerator {
    async fn generate(&self, _original_image: &[u8], prompt: &str) -> AppResult<String> {
        if self.api_key.is_empty() {
            return Err(AppError::ImageGeneration("OpenAI API key not configured".to_string()));
        }

        let url = format!("{}/images/generations", self.base_url);
        let request = ImageRequest {
            model: &self.model,
            prompt,
            size: &self.size,
            quality: &self.quality,
            n: 1,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ImageGeneration(format!("OpenAI image request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ImageGeneration(describe_api_error("OpenAI", status, &error_text)));
        }

        let body: ImageResponse = response
            .json()
            .await
            .map_err(|e| AppError::ImageGeneration(format!("Failed to parse OpenAI image response: {}", e)))?;

        let image = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ImageGeneration("OpenAI returned no images".to_string()))?;

        match (image.b64_json, image.url) {
            (Some(b64), _) if !b64.is_empty() => Ok(b64),
            (_, Some(image_url)) => {
                debug!(url = %image_url, "Downloading generated image");
                let bytes = self.download(&image_url).await?;
                Ok(STANDARD.encode(bytes))
            }
            _ => Err(AppError::ImageGeneration("OpenAI image had neither url nor b64_json".to_string())),
        }
    }
}
