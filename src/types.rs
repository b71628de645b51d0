// Type definitions shared by the vision, generation and HTTP layers

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
}

/// Content part for multimodal messages (text or inline image)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_base64")]
    ImageBase64 {
        base64: String,
        media_type: String, // e.g., "image/jpeg", "image/png"
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: Vec<ContentPart>,
}

impl LLMMessage {
    /// Create a user message with base64 image (for vision models)
    pub fn user_with_base64_image(
        text: impl Into<String>,
        base64: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageBase64 {
                    base64: base64.into(),
                    media_type: media_type.into(),
                    detail: None,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Image generation error: {0}")]
    ImageGeneration(String),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Client input rejected before any upstream call; the message is returned as-is
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload error: {0}")]
    Upload(#[from] axum::extract::multipart::MultipartError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
