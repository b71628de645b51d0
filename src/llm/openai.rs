// OpenAI-compatible chat completion adapter
// Used for the multimodal room description; images are sent as data URLs.
// API Reference: https://platform.openai.com/docs/api-reference/chat

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, ContentPart, LLMMessage, LLMRequest, LLMResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct OpenAIAdapter {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ChatImageUrl },
}

#[derive(Serialize)]
struct ChatImageUrl {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
pub(crate) struct OpenAIErrorResponse {
    pub(crate) error: OpenAIError,
}

#[derive(Deserialize)]
pub(crate) struct OpenAIError {
    pub(crate) message: String,
    #[serde(rename = "type")]
    #[allow(dead_code)]
    pub(crate) error_type: Option<String>,
    pub(crate) code: Option<String>,
}

impl OpenAIAdapter {
    /// `base_url` may be any OpenAI-compatible endpoint (proxies, test servers)
    pub fn with_client(client: Client, api_key: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn convert_message(msg: &LLMMessage) -> ChatMessage {
        let content = msg
            .content
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => ChatContentPart::Text { text: text.clone() },
                ContentPart::ImageBase64 { base64, media_type, detail } => ChatContentPart::ImageUrl {
                    image_url: ChatImageUrl {
                        url: format!("data:{};base64,{}", media_type, base64),
                        detail: detail.clone(),
                    },
                },
            })
            .collect();

        ChatMessage {
            role: msg.role.clone(),
            content,
        }
    }
}

/// Render a non-2xx body as a readable error, preferring the provider's own message
pub(crate) fn describe_api_error(provider: &str, status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(body) {
        return format!(
            "{} API error ({}): {} (code: {:?})",
            provider, status, error_response.error.message, error_response.error.code
        );
    }
    format!("{} API error ({}): {}", provider, status, body)
}

#[async_trait]
impl LLMAdapter for OpenAIAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        if !self.has_api_key() {
            return Err(AppError::LLMApi("OpenAI API key not configured".to_string()));
        }

        let url = format!("{}/chat/completions", self.base_url);

        let chat_request = ChatRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(Self::convert_message).collect(),
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMApi(describe_api_error("OpenAI", status, &error_text)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMApi(format!("Failed to parse OpenAI response: {}", e)))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLMApi("OpenAI returned no choices".to_string()))?;

        let usage = chat_response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason.unwrap_or_else(|| "unknown".to_string()),
            usage,
        })
    }
}
