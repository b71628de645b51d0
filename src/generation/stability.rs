// Stability AI image-to-image generation
// API Reference: https://platform.stability.ai/docs/api-reference#tag/SDXL-and-SD1.6/operation/imageToImage
//
// Unlike DALL-E this starts from the uploaded photo, so the room geometry is
// kept and only restyled. IMAGE_STRENGTH 0.35 keeps ~35% of the original.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use super::ImageGenerator;
use crate::analysis::sniff_media_type;
use crate::config::StabilityConfig;
use crate::llm::openai::describe_api_error;
use crate::types::{AppError, AppResult};

const IMAGE_STRENGTH: &str = "0.35";
const STEPS: &str = "40";
const SEED: &str = "0";
const CFG_SCALE: &str = "7";
const SAMPLES: &str = "1";

pub struct StabilityImageGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    engine: String,
}

#[derive(Deserialize)]
struct GenerationResponse {
    artifacts: Vec<Artifact>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Artifact {
    base64: String,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl StabilityImageGenerator {
    pub fn new(client: Client, config: &StabilityConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            engine: config.engine.clone(),
        }
    }

    fn form(original_image: &[u8], prompt: &str) -> AppResult<Form> {
        let init_image = Part::bytes(original_image.to_vec())
            .file_name("room")
            .mime_str(sniff_media_type(original_image))?;

        Ok(Form::new()
            .part("init_image", init_image)
            .text("init_image_mode", "IMAGE_STRENGTH")
            .text("image_strength", IMAGE_STRENGTH)
            .text("steps", STEPS)
            .text("seed", SEED)
            .text("cfg_scale", CFG_SCALE)
            .text("samples", SAMPLES)
            .text("text_prompts[0][text]", prompt.to_string())
            .text("text_prompts[0][weight]", "1"))
    }
}

#[async_trait]
impl ImageGenerator for StabilityImageGenerator {
    async fn generate(&self, original_image: &[u8], prompt: &str) -> AppResult<String> {
        if self.api_key.is_empty() {
            return Err(AppError::ImageGeneration("Stability API key not configured".to_string()));
        }

        let url = format!("{}/generation/{}/image-to-image", self.base_url, self.engine);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(Self::form(original_image, prompt)?)
            .send()
            .await
            .map_err(|e| AppError::ImageGeneration(format!("Stability request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ImageGeneration(describe_api_error("Stability", status, &error_text)));
        }

        let body: GenerationResponse = response
            .json()
            .await
            .map_err(|e| AppError::ImageGeneration(format!("Failed to parse Stability response: {}", e)))?;

        let artifact = body
            .artifacts
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ImageGeneration("Stability returned no artifacts".to_string()))?;

        // Filtered outputs come back blurred with finishReason CONTENT_FILTERED
        if artifact.finish_reason.as_deref() == Some("CONTENT_FILTERED") {
            return Err(AppError::ImageGeneration("Stability filtered the generated image".to_string()));
        }

        Ok(artifact.base64)
    }
}
