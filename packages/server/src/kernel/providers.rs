// Provider adapters wrapping the image-client crate.
//
// These are the infrastructure implementations of BaseImageProvider.
// Provider-reported failures (quota, content rejection) become ok:false
// results; transport faults bubble up as Err for the orchestrator to
// convert into PROVIDER_ERROR.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use image_client::{GeminiImageClient, ImageClientError, ImagePrompt, OpenAiImageClient};

use crate::domains::image_engine::decision::{PROVIDER_NANO_BANANA, PROVIDER_OPENAI};
use crate::domains::image_engine::models::ProviderResult;
use crate::kernel::traits::{BaseImageProvider, ProviderRequest};

/// Map a provider-reported API error onto a short adapter code and a
/// user-safe message. Raw provider messages never leave the adapter.
fn classify_api_error(code: &str, message: &str) -> (String, String) {
    let haystack = format!("{} {}", code, message).to_lowercase();
    if haystack.contains("content_policy")
        || haystack.contains("moderation")
        || haystack.contains("safety")
    {
        (
            "CONTENT_REJECTED".to_string(),
            "The image provider declined this request.".to_string(),
        )
    } else if haystack.contains("quota")
        || haystack.contains("rate")
        || haystack.contains("429")
        || haystack.contains("billing")
    {
        (
            "QUOTA_EXCEEDED".to_string(),
            "The image provider quota is exhausted.".to_string(),
        )
    } else {
        (
            "PROVIDER_ERROR".to_string(),
            "The image provider could not complete this request.".to_string(),
        )
    }
}

fn prompt_from(request: &ProviderRequest) -> ImagePrompt {
    ImagePrompt {
        prompt: request.prompt.clone(),
        negative_prompt: if request.negative_prompt.is_empty() {
            None
        } else {
            Some(request.negative_prompt.clone())
        },
        width: request.width,
        height: request.height,
    }
}

fn rejected(provider: &str, error: ImageClientError) -> ProviderResult {
    let (code, message) = match &error {
        ImageClientError::Api { code, message } => classify_api_error(code, message),
        _ => (
            "PROVIDER_ERROR".to_string(),
            "The image provider could not complete this request.".to_string(),
        ),
    };
    tracing::warn!(provider, error_code = %code, "Provider rejected generation");
    ProviderResult {
        ok: false,
        provider: provider.to_string(),
        image_bytes: None,
        mime_type: None,
        error_code: Some(code),
        error_message_safe: Some(message),
    }
}

// =============================================================================
// OpenAI provider
// =============================================================================

pub struct OpenAiProvider {
    client: Arc<OpenAiImageClient>,
}

impl OpenAiProvider {
    pub fn new(client: Arc<OpenAiImageClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BaseImageProvider for OpenAiProvider {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResult> {
        match self.client.generate(&prompt_from(request)).await {
            Ok(image) => Ok(ProviderResult {
                ok: true,
                provider: PROVIDER_OPENAI.to_string(),
                image_bytes: Some(image.bytes),
                mime_type: Some(image.mime_type),
                error_code: None,
                error_message_safe: None,
            }),
            Err(e) if e.is_api_error() => Ok(rejected(PROVIDER_OPENAI, e)),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Gemini (nano_banana) provider
// =============================================================================

pub struct NanoBananaProvider {
    client: Arc<GeminiImageClient>,
}

impl NanoBananaProvider {
    pub fn new(client: Arc<GeminiImageClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BaseImageProvider for NanoBananaProvider {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResult> {
        match self.client.generate(&prompt_from(request)).await {
            Ok(image) => Ok(ProviderResult {
                ok: true,
                provider: PROVIDER_NANO_BANANA.to_string(),
                image_bytes: Some(image.bytes),
                mime_type: Some(image.mime_type),
                error_code: None,
                error_message_safe: None,
            }),
            Err(e) if e.is_api_error() => Ok(rejected(PROVIDER_NANO_BANANA, e)),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Provider registry
// =============================================================================

/// The two supported providers, keyed by id.
///
/// Unrecognized ids collapse onto the secondary provider with a warning
/// rather than failing the request; the decision layer only emits known ids,
/// so an unknown id here means a misconfiguration upstream.
#[derive(Clone)]
pub struct ProviderRegistry {
    openai: Arc<dyn BaseImageProvider>,
    nano_banana: Arc<dyn BaseImageProvider>,
}

impl ProviderRegistry {
    pub fn new(
        openai: Arc<dyn BaseImageProvider>,
        nano_banana: Arc<dyn BaseImageProvider>,
    ) -> Self {
        Self { openai, nano_banana }
    }

    /// Resolve a provider id to the normalized id and its adapter.
    pub fn resolve(&self, provider_id: &str) -> (&'static str, Arc<dyn BaseImageProvider>) {
        match provider_id {
            PROVIDER_OPENAI => (PROVIDER_OPENAI, self.openai.clone()),
            PROVIDER_NANO_BANANA => (PROVIDER_NANO_BANANA, self.nano_banana.clone()),
            other => {
                tracing::warn!(
                    provider_id = other,
                    "Unrecognized provider id, using secondary provider"
                );
                (PROVIDER_NANO_BANANA, self.nano_banana.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_classify_to_adapter_codes() {
        let (code, _) = classify_api_error("content_policy_violation", "rejected");
        assert_eq!(code, "CONTENT_REJECTED");

        let (code, _) = classify_api_error("429", "Rate limit reached");
        assert_eq!(code, "QUOTA_EXCEEDED");

        let (code, _) = classify_api_error("500", "internal error");
        assert_eq!(code, "PROVIDER_ERROR");
    }

    #[test]
    fn safe_messages_do_not_echo_provider_text() {
        let (_, message) = classify_api_error("400", "prompt contained: secret internal detail");
        assert!(!message.contains("secret internal detail"));
    }
}
