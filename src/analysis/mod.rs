//! Room Analysis
//!
//! Combines two independent views of the uploaded photo:
//!
//! - **Pixel heuristics** ([`vision`]): edge contours, brightness and colour balance
//! - **AI description**: a multimodal chat model describes the room in free text
//!
//! The room type is then inferred from keywords in the AI description. Both
//! halves degrade to fixed fallbacks so analysis never fails a request.

pub mod vision;

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::AnalysisConfig;
use crate::llm::LLMAdapter;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

pub const DESCRIPTION_PROMPT: &str = "Analyze this room image. Identify furniture, room type, color scheme, lighting, and style. Provide a detailed description for interior decoration purposes.";

pub const DESCRIPTION_UNAVAILABLE: &str =
    "AI analysis unavailable. Basic room detected with standard furniture layout.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAnalysis {
    pub detected_elements: Vec<String>,
    pub ai_description: String,
    pub room_type: String,
    pub lighting: String,
    pub color_scheme: String,
}

impl RoomAnalysis {
    /// Analysis reported when the image could not be processed at all
    pub fn failed() -> Self {
        Self {
            detected_elements: vec!["Unable to analyze".to_string()],
            ai_description: "Analysis failed".to_string(),
            room_type: "Unknown".to_string(),
            lighting: "Natural".to_string(),
            color_scheme: "Neutral".to_string(),
        }
    }
}

/// Results of the pixel pass over the decoded image
#[derive(Debug, Clone)]
struct VisualFeatures {
    detected_elements: Vec<String>,
    lighting: &'static str,
    color_scheme: &'static str,
}

/// Infer the room type from keywords in a free-text description.
/// Categories are checked in a fixed order and the first match wins.
pub fn determine_room_type(ai_description: &str) -> &'static str {
    let text = ai_description.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if mentions(&["kitchen", "stove", "refrigerator"]) {
        "Kitchen"
    } else if mentions(&["bedroom", "bed"]) {
        "Bedroom"
    } else if mentions(&["bathroom", "toilet", "shower"]) {
        "Bathroom"
    } else if mentions(&["dining"]) {
        "Dining Room"
    } else if mentions(&["living", "sofa", "couch"]) {
        "Living Room"
    } else {
        "General Room"
    }
}

/// MIME type of the encoded image, defaulting to JPEG when it cannot be sniffed
pub fn sniff_media_type(image_data: &[u8]) -> &'static str {
    image::guess_format(image_data)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/jpeg")
}

fn decode_rgb(image_data: &[u8]) -> AppResult<RgbImage> {
    let rgb = image::load_from_memory(image_data)?.to_rgb8();
    debug!(width = rgb.width(), height = rgb.height(), "Decoded room image");
    Ok(rgb)
}

fn extract_features(rgb: &RgbImage, config: &AnalysisConfig) -> VisualFeatures {
    let mean = vision::mean_color(rgb);
    VisualFeatures {
        detected_elements: vision::detect_room_elements(rgb, config),
        lighting: vision::lighting_label(mean),
        color_scheme: vision::color_scheme_label(mean),
    }
}

pub struct RoomAnalyzer {
    llm: Arc<dyn LLMAdapter>,
    vision_model: String,
    max_tokens: u32,
    config: AnalysisConfig,
}

impl RoomAnalyzer {
    pub fn new(
        llm: Arc<dyn LLMAdapter>,
        vision_model: impl Into<String>,
        max_tokens: u32,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            llm,
            vision_model: vision_model.into(),
            max_tokens,
            config,
        }
    }

    /// Analyze a room photo. Never fails: undecodable images yield [`RoomAnalysis::failed`]
    /// without calling the vision model.
    pub async fn analyze_room(&self, image_data: Arc<[u8]>) -> RoomAnalysis {
        let decoded = {
            let data = Arc::clone(&image_data);
            tokio::task::spawn_blocking(move || decode_rgb(&data)).await
        };

        let rgb = match decoded {
            Ok(Ok(rgb)) => rgb,
            Ok(Err(e)) => {
                error!(error = %e, "Error analyzing room image");
                return RoomAnalysis::failed();
            }
            Err(e) => {
                error!(error = %e, "Room image decode task panicked");
                return RoomAnalysis::failed();
            }
        };

        let pixels = {
            let config = self.config.clone();
            tokio::task::spawn_blocking(move || extract_features(&rgb, &config))
        };

        let (features, ai_description) = tokio::join!(pixels, self.describe_room(&image_data));

        let features = match features {
            Ok(features) => features,
            Err(e) => {
                error!(error = %e, "Room analysis task panicked");
                return RoomAnalysis::failed();
            }
        };

        let room_type = determine_room_type(&ai_description);
        info!(
            room_type,
            lighting = features.lighting,
            color_scheme = features.color_scheme,
            elements = features.detected_elements.len(),
            "Room analysis complete"
        );

        RoomAnalysis {
            detected_elements: features.detected_elements,
            ai_description,
            room_type: room_type.to_string(),
            lighting: features.lighting.to_string(),
            color_scheme: features.color_scheme.to_string(),
        }
    }

    /// Free-text description from the vision model, or a fixed fallback
    pub async fn describe_room(&self, image_data: &[u8]) -> String {
        match self.request_description(image_data).await {
            Ok(description) => description,
            Err(e) => {
                warn!(error = %e, "Error calling vision model, using fallback description");
                DESCRIPTION_UNAVAILABLE.to_string()
            }
        }
    }

    async fn request_description(&self, image_data: &[u8]) -> AppResult<String> {
        let request = LLMRequest {
            model: self.vision_model.clone(),
            messages: vec![LLMMessage::user_with_base64_image(
                DESCRIPTION_PROMPT,
                STANDARD.encode(image_data),
                sniff_media_type(image_data),
            )],
            max_tokens: Some(self.max_tokens),
        };

        let response = self.llm.create_chat_completion(&request).await?;
        if response.content.trim().is_empty() {
            return Err(AppError::LLMApi("Vision model returned an empty description".to_string()));
        }
        Ok(response.content)
    }
}
