use std::sync::Arc;
use std::time::Duration;

use governor::DefaultDirectRateLimiter;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::analysis::{RoomAnalysis, RoomAnalyzer};
use crate::config::Config;
use crate::decorator::DecorationService;
use crate::generation;
use crate::llm::OpenAIAdapter;
use crate::middleware::build_rate_limiter;
use crate::types::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub analyzer: Arc<RoomAnalyzer>,
    pub decorator: Arc<DecorationService>,
    /// Shared budget for endpoints that call paid upstream APIs; `None` when disabled
    pub rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl AppState {
    /// Wire the analyzer and generator to the upstream APIs named in `config`
    pub fn from_config(config: Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.generation.request_timeout_secs))
            .build()?;

        let llm = Arc::new(OpenAIAdapter::with_client(
            client.clone(),
            &config.openai.api_key,
            &config.openai.base_url,
        ));
        let analyzer = RoomAnalyzer::new(
            llm,
            config.openai.vision_model.clone(),
            config.openai.vision_max_tokens,
            config.analysis.clone(),
        );

        let generator = generation::from_config(&config, client);
        let decorator = DecorationService::new(
            generator,
            config.generation.variations,
            config.generation.max_concurrent,
        );

        Ok(Self {
            rate_limiter: build_rate_limiter(config.rate_limit.per_minute),
            analyzer: Arc::new(analyzer),
            decorator: Arc::new(decorator),
            config,
        })
    }
}

fn default_preserve() -> bool {
    true
}

/// Style preferences attached to a decoration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DecorationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "designStyle is required"))]
    pub design_style: String,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub color_preference: Option<String>,
    #[serde(default)]
    pub budget_range: Option<String>,
    #[serde(default = "default_preserve")]
    pub preserve_existing_furniture: bool,
}

/// JSON variant of the decorate endpoint: preferences plus the photo as base64
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DecorationRequestWithImage {
    #[serde(default)]
    #[validate(length(min = 1, message = "imageBase64 is required"))]
    pub image_base64: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "designStyle is required"))]
    pub design_style: String,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub color_preference: Option<String>,
    #[serde(default)]
    pub budget_range: Option<String>,
    #[serde(default = "default_preserve")]
    pub preserve_existing_furniture: bool,
}

impl DecorationRequestWithImage {
    /// Split into the raw base64 payload and the style preferences
    pub fn into_parts(self) -> (String, DecorationRequest) {
        (
            self.image_base64,
            DecorationRequest {
                design_style: self.design_style,
                room_type: self.room_type,
                color_preference: self.color_preference,
                budget_range: self.budget_range,
                preserve_existing_furniture: self.preserve_existing_furniture,
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratedRoomOption {
    pub id: String,
    pub design_style: String,
    pub image_base64: String,
    pub description: String,
    pub added_elements: Vec<String>,
    pub modified_elements: Vec<String>,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationResponse {
    pub options: Option<Vec<DecoratedRoomOption>>,
    pub original_image_analysis: String,
    pub success: bool,
    pub message: String,
}

impl DecorationResponse {
    pub fn success(options: Vec<DecoratedRoomOption>, analysis: &RoomAnalysis) -> Self {
        let message = format!("Successfully generated {} decoration options", options.len());
        Self {
            options: Some(options),
            original_image_analysis: analysis.ai_description.clone(),
            success: true,
            message,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            options: None,
            original_image_analysis: String::new(),
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAnalysisResponse {
    pub analysis: Option<RoomAnalysis>,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignStyleInfo {
    pub name: String,
    pub description: String,
}
