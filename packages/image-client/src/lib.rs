//! Pure REST clients for image generation providers
//!
//! Minimal clients for the OpenAI Images API and Google's Gemini image model
//! with no domain-specific logic. Callers hand over a finished prompt and get
//! raw image bytes back; everything about what to prompt for lives upstream.
//!
//! # Example
//!
//! ```rust,ignore
//! use image_client::{ImagePrompt, OpenAiImageClient};
//!
//! let client = OpenAiImageClient::from_env()?;
//! let image = client
//!     .generate(&ImagePrompt {
//!         prompt: "abstract geometric background".into(),
//!         negative_prompt: None,
//!         width: 1080,
//!         height: 1080,
//!     })
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{ImageClientError, Result};
pub use types::{GeneratedImage, ImagePrompt};

use base64::Engine as _;
use reqwest::Client;
use tracing::{debug, warn};

use types::*;

/// Sizes supported by the OpenAI `gpt-image-1` model.
const OPENAI_SIZES: [(u32, u32); 3] = [(1024, 1024), (1536, 1024), (1024, 1536)];

/// Map an arbitrary target canvas onto the closest size `gpt-image-1`
/// supports, by aspect ratio: square-ish targets get the square size,
/// wide targets the landscape size, tall targets the portrait size.
pub fn closest_openai_size(width: u32, height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return OPENAI_SIZES[0];
    }
    let ratio = width as f64 / height as f64;
    if ratio > 1.2 {
        OPENAI_SIZES[1]
    } else if ratio < 0.83 {
        OPENAI_SIZES[2]
    } else {
        OPENAI_SIZES[0]
    }
}

/// Fold a negative prompt into the main prompt text.
///
/// Neither provider accepts a separate negative prompt parameter, so the
/// exclusions are appended as an instruction sentence.
fn fold_negative(prompt: &str, negative: Option<&str>) -> String {
    match negative {
        Some(neg) if !neg.is_empty() => format!("{}. Strictly avoid: {}.", prompt, neg),
        _ => prompt.to_string(),
    }
}

// =============================================================================
// OpenAI Images API client
// =============================================================================

/// Client for the OpenAI Images API (`gpt-image-1`).
#[derive(Clone)]
pub struct OpenAiImageClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiImageClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-image-1".to_string(),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ImageClientError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Generate a single image. One HTTP call, no retries.
    pub async fn generate(&self, request: &ImagePrompt) -> Result<GeneratedImage> {
        let (w, h) = closest_openai_size(request.width, request.height);
        let body = OpenAiImageRequest {
            model: self.model.clone(),
            prompt: fold_negative(&request.prompt, request.negative_prompt.as_deref()),
            size: format!("{}x{}", w, h),
            n: 1,
        };

        let response = self
            .http_client
            .post(format!("{}/images/generations", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI image request failed");
                ImageClientError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, "OpenAI image API error");
            // Try to pull a structured code out of the error body
            let (code, message) = match serde_json::from_str::<OpenAiErrorResponse>(&error_text) {
                Ok(parsed) => (
                    parsed
                        .error
                        .code
                        .or(parsed.error.error_type)
                        .unwrap_or_else(|| status.as_u16().to_string()),
                    parsed.error.message,
                ),
                Err(_) => (status.as_u16().to_string(), error_text),
            };
            return Err(ImageClientError::Api { code, message });
        }

        let image_response: OpenAiImageResponse = response
            .json()
            .await
            .map_err(|e| ImageClientError::Parse(e.to_string()))?;

        let data = image_response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ImageClientError::Api {
                code: "empty_response".into(),
                message: "No image returned by OpenAI".into(),
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.b64_json)
            .map_err(|e| ImageClientError::Parse(format!("Invalid base64 payload: {}", e)))?;

        debug!(bytes = bytes.len(), "OpenAI image generated");

        Ok(GeneratedImage {
            bytes,
            mime_type: "image/png".to_string(),
        })
    }
}

// =============================================================================
// Gemini image client
// =============================================================================

/// Client for Google's Gemini image model (`gemini-2.5-flash-image`).
#[derive(Clone)]
pub struct GeminiImageClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiImageClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash-image".to_string(),
        }
    }

    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ImageClientError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Generate a single image. One HTTP call, no retries.
    ///
    /// Gemini takes no size parameter; the target canvas is expressed as a
    /// framing instruction in the prompt text.
    pub async fn generate(&self, request: &ImagePrompt) -> Result<GeneratedImage> {
        let framing = if request.width > request.height {
            "wide landscape"
        } else if request.height > request.width {
            "tall portrait"
        } else {
            "square"
        };
        let prompt = format!(
            "{} ({} composition)",
            fold_negative(&request.prompt, request.negative_prompt.as_deref()),
            framing
        );

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiTextPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini image request failed");
                ImageClientError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini image API error");
            return Err(ImageClientError::Api {
                code: status.as_u16().to_string(),
                message: error_text,
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ImageClientError::Parse(e.to_string()))?;

        let inline = gemini_response
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.inline_data)
            .ok_or_else(|| ImageClientError::Api {
                code: "empty_response".into(),
                message: "No inline image data returned by Gemini".into(),
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(inline.data)
            .map_err(|e| ImageClientError::Parse(format!("Invalid base64 payload: {}", e)))?;

        debug!(bytes = bytes.len(), mime_type = %inline.mime_type, "Gemini image generated");

        Ok(GeneratedImage {
            bytes,
            mime_type: inline.mime_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builders() {
        let openai = OpenAiImageClient::new("sk-test").with_base_url("https://custom.api.com");
        assert_eq!(openai.api_key, "sk-test");
        assert_eq!(openai.base_url, "https://custom.api.com");

        let gemini = GeminiImageClient::new("test-key").with_base_url("http://localhost:9999");
        assert_eq!(gemini.base_url, "http://localhost:9999");
    }

    #[test]
    fn test_closest_openai_size() {
        // Square-ish targets
        assert_eq!(closest_openai_size(1080, 1080), (1024, 1024));
        assert_eq!(closest_openai_size(1200, 1100), (1024, 1024));
        // Wide targets
        assert_eq!(closest_openai_size(1600, 900), (1536, 1024));
        assert_eq!(closest_openai_size(1200, 630), (1536, 1024));
        // Tall targets
        assert_eq!(closest_openai_size(1080, 1350), (1024, 1536));
        assert_eq!(closest_openai_size(1080, 1920), (1024, 1536));
        // Degenerate input falls back to square
        assert_eq!(closest_openai_size(0, 100), (1024, 1024));
    }

    #[test]
    fn test_fold_negative() {
        assert_eq!(fold_negative("a scene", None), "a scene");
        assert_eq!(
            fold_negative("a scene", Some("text, logos")),
            "a scene. Strictly avoid: text, logos."
        );
        assert_eq!(fold_negative("a scene", Some("")), "a scene");
    }
}
