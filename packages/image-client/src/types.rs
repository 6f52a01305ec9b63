//! Shared request and response types for the provider clients.

use serde::{Deserialize, Serialize};

// =============================================================================
// Client-facing types
// =============================================================================

/// A single image generation request.
///
/// `width`/`height` express the caller's target canvas; providers that only
/// support fixed sizes map them to the closest supported size (see
/// [`closest_openai_size`](crate::closest_openai_size)).
#[derive(Debug, Clone)]
pub struct ImagePrompt {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// A generated image as raw bytes plus its mime type.
#[derive(Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl std::fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("bytes", &format!("{} bytes", self.bytes.len()))
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

// =============================================================================
// OpenAI Images API wire types
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub n: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiImageResponse {
    pub data: Vec<OpenAiImageData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiImageData {
    pub b64_json: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiErrorResponse {
    pub error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

// =============================================================================
// Gemini (generateContent) wire types
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiContent {
    pub parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiTextPart {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiCandidate {
    pub content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiResponsePart {
    #[serde(rename = "inlineData", default)]
    pub inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}
