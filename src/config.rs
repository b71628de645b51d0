use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub openai: OpenAIConfig,
    pub stability: StabilityConfig,
    pub generation: GenerationConfig,
    pub analysis: AnalysisConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub vision_model: String,
    pub vision_max_tokens: u32,
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
}

// Keys stay out of the startup log line
impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &mask(&self.api_key))
            .field("base_url", &self.base_url)
            .field("vision_model", &self.vision_model)
            .field("vision_max_tokens", &self.vision_max_tokens)
            .field("image_model", &self.image_model)
            .field("image_size", &self.image_size)
            .field("image_quality", &self.image_quality)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct StabilityConfig {
    pub api_key: String,
    pub base_url: String,
    pub engine: String,
}

impl std::fmt::Debug for StabilityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StabilityConfig")
            .field("api_key", &mask(&self.api_key))
            .field("base_url", &self.base_url)
            .field("engine", &self.engine)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ImageProvider {
    OpenAI,
    Stability,
}

impl std::str::FromStr for ImageProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "dall-e" | "dalle" => Ok(ImageProvider::OpenAI),
            "stability" | "stable-diffusion" => Ok(ImageProvider::Stability),
            other => Err(anyhow::anyhow!("Unsupported image provider: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub provider: ImageProvider,
    pub variations: usize,
    /// Image generation calls in flight across all requests
    pub max_concurrent: usize,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub canny_low: f32,
    pub canny_high: f32,
    pub min_contour_area: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            min_contour_area: 5000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Expensive requests allowed per minute; 0 disables limiting
    pub per_minute: u32,
}

pub const MAX_VARIATIONS: usize = 3;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .unwrap_or_else(|_| "10485760".to_string())
                    .parse()?,
            },
            openai: OpenAIConfig {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                vision_model: env::var("OPENAI_VISION_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                vision_max_tokens: env::var("OPENAI_VISION_MAX_TOKENS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()?,
                image_model: env::var("OPENAI_IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".to_string()),
                image_size: env::var("OPENAI_IMAGE_SIZE").unwrap_or_else(|_| "1024x1024".to_string()),
                image_quality: env::var("OPENAI_IMAGE_QUALITY").unwrap_or_else(|_| "standard".to_string()),
            },
            stability: StabilityConfig {
                api_key: env::var("STABILITY_API_KEY").unwrap_or_default(),
                base_url: env::var("STABILITY_BASE_URL")
                    .unwrap_or_else(|_| "https://api.stability.ai/v1".to_string()),
                engine: env::var("STABILITY_ENGINE")
                    .unwrap_or_else(|_| "stable-diffusion-xl-1024-v1-0".to_string()),
            },
            generation: GenerationConfig {
                provider: env::var("IMAGE_PROVIDER")
                    .unwrap_or_else(|_| "openai".to_string())
                    .parse()?,
                variations: env::var("GENERATION_VARIATIONS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse::<usize>()?
                    .clamp(1, MAX_VARIATIONS),
                max_concurrent: env::var("GENERATION_CONCURRENCY")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse::<usize>()?
                    .max(1),
                request_timeout_secs: env::var("GENERATION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse()?,
            },
            analysis: AnalysisConfig {
                canny_low: env::var("CANNY_LOW")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()?,
                canny_high: env::var("CANNY_HIGH")
                    .unwrap_or_else(|_| "150".to_string())
                    .parse()?,
                min_contour_area: env::var("MIN_CONTOUR_AREA")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()?,
            },
            rate_limit: RateLimitConfig {
                per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            },
        })
    }

    /// Configuration pointing both upstream APIs at `base_url`, used by tests
    #[doc(hidden)]
    pub fn for_upstream(base_url: &str) -> Self {
        Self {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
                cors_allowed_origins: vec!["*".to_string()],
                max_upload_bytes: 10 * 1024 * 1024,
            },
            openai: OpenAIConfig {
                api_key: "test-key".to_string(),
                base_url: base_url.to_string(),
                vision_model: "gpt-4o".to_string(),
                vision_max_tokens: 500,
                image_model: "dall-e-3".to_string(),
                image_size: "1024x1024".to_string(),
                image_quality: "standard".to_string(),
            },
            stability: StabilityConfig {
                api_key: String::new(),
                base_url: base_url.to_string(),
                engine: "stable-diffusion-xl-1024-v1-0".to_string(),
            },
            generation: GenerationConfig {
                provider: ImageProvider::OpenAI,
                variations: MAX_VARIATIONS,
                max_concurrent: 3,
                request_timeout_secs: 10,
            },
            analysis: AnalysisConfig::default(),
            rate_limit: RateLimitConfig { per_minute: 0 },
        }
    }
}

fn mask(key: &str) -> String {
    if key.is_empty() {
        "<unset>".to_string()
    } else if key.len() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", key.chars().take(4).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_provider_parse() {
        assert_eq!("openai".parse::<ImageProvider>().unwrap(), ImageProvider::OpenAI);
        assert_eq!("Stability".parse::<ImageProvider>().unwrap(), ImageProvider::Stability);
        assert!("midjourney".parse::<ImageProvider>().is_err());
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config = Config::for_upstream("http://localhost");
        let mut openai = config.openai.clone();
        openai.api_key = "sk-abcdefghijklmnop".to_string();
        let rendered = format!("{:?}", openai);
        assert!(!rendered.contains("abcdefghijklmnop"));
        assert!(rendered.contains("sk-a****"));
    }

    #[test]
    fn test_analysis_defaults() {
        let analysis = AnalysisConfig::default();
        assert_eq!(analysis.canny_low, 50.0);
        assert_eq!(analysis.canny_high, 150.0);
        assert_eq!(analysis.min_contour_area, 5000.0);
    }
}
