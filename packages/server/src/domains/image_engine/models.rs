//! Request, decision, and result types for the image generation pipeline.
//!
//! Wire format is camelCase JSON (the endpoint is consumed by web clients).
//! `ImageEngineResult` is a tagged union discriminated by `ok` so that a
//! success body can never carry an error and vice versa.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Request
// =============================================================================

/// The application that originated the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerApp {
    SocialAutoPoster,
    OffersPromotions,
    EventCampaign,
    ReviewResponder,
    BrandKitBuilder,
    SeoAuditRoadmap,
    Other,
}

/// Target publishing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Facebook,
    X,
    GoogleBusinessProfile,
    Blog,
}

/// Marketing content category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Educational,
    Promotion,
    SocialProof,
    LocalAbstract,
    Evergreen,
}

/// Canvas aspect for the generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    Square,
    Portrait,
    Landscape,
    Story,
}

/// Opt-in stricter safety evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeMode {
    Strict,
}

impl ConsumerApp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumerApp::SocialAutoPoster => "social_auto_poster",
            ConsumerApp::OffersPromotions => "offers_promotions",
            ConsumerApp::EventCampaign => "event_campaign",
            ConsumerApp::ReviewResponder => "review_responder",
            ConsumerApp::BrandKitBuilder => "brand_kit_builder",
            ConsumerApp::SeoAuditRoadmap => "seo_audit_roadmap",
            ConsumerApp::Other => "other",
        }
    }
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::X => "x",
            Platform::GoogleBusinessProfile => "google_business_profile",
            Platform::Blog => "blog",
        }
    }

    /// Human-readable name for alt text.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::X => "X",
            Platform::GoogleBusinessProfile => "Google Business Profile",
            Platform::Blog => "a blog post",
        }
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Educational => "educational",
            Category::Promotion => "promotion",
            Category::SocialProof => "social_proof",
            Category::LocalAbstract => "local_abstract",
            Category::Evergreen => "evergreen",
        }
    }
}

/// Business identity hints supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Free-text style description (e.g. "warm and friendly", "luxury spa").
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleInfo {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// A validated image generation request. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEngineRequest {
    /// Caller-supplied idempotency-intent key. Non-empty.
    pub request_id: String,
    pub consumer_app: ConsumerApp,
    pub platform: Platform,
    pub category: Category,
    /// What the caller wants the image to convey.
    pub intent_summary: String,
    #[serde(default)]
    pub brand: Option<BrandProfile>,
    #[serde(default)]
    pub locale: Option<LocaleInfo>,
    #[serde(default)]
    pub allow_text_overlay: Option<bool>,
    #[serde(default)]
    pub safe_mode: Option<SafeMode>,
}

impl ImageEngineRequest {
    /// Field-level validation beyond what serde enforces.
    pub fn validate(&self) -> Result<(), String> {
        if self.request_id.trim().is_empty() {
            return Err("requestId must be non-empty".to_string());
        }
        if self.intent_summary.trim().is_empty() {
            return Err("intentSummary must be non-empty".to_string());
        }
        Ok(())
    }

    pub fn strict_mode(&self) -> bool {
        matches!(self.safe_mode, Some(SafeMode::Strict))
    }
}

// =============================================================================
// Decision
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    Generate,
    Fallback,
}

/// Inputs the prompt builder will work from. `negative_rules` are rule ids,
/// not prompt text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPlan {
    pub negative_rules: Vec<String>,
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPlan {
    pub provider_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionSafety {
    pub reasons: Vec<String>,
}

/// The generation plan derived from a request. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub mode: DecisionMode,
    pub platform: Platform,
    pub category: Category,
    pub aspect: Aspect,
    pub prompt_plan: PromptPlan,
    pub provider_plan: ProviderPlan,
    pub safety: DecisionSafety,
}

// =============================================================================
// Safety
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    Fallback,
    Block,
}

/// Outcome of the rule-based safety evaluation. Deterministic for identical
/// inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyResult {
    pub verdict: Verdict,
    /// User-facing explanation. Never raw rule internals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_safe: Option<String>,
    pub tags: Vec<String>,
}

// =============================================================================
// Prompt
// =============================================================================

/// The constructed prompt pair. Exists only in pipeline memory.
///
/// Deliberately not `Serialize`: nothing downstream may persist or log it.
#[derive(Debug, Clone)]
pub struct PromptBundle {
    pub prompt: String,
    pub negative_prompt: String,
}

// =============================================================================
// Adapter results (transient)
// =============================================================================

/// Raw provider output. Never stored as-is; only derived fields survive the
/// pipeline. Deliberately not `Serialize`.
#[derive(Clone)]
pub struct ProviderResult {
    pub ok: bool,
    pub provider: String,
    pub image_bytes: Option<Vec<u8>>,
    pub mime_type: Option<String>,
    pub error_code: Option<String>,
    pub error_message_safe: Option<String>,
}

impl std::fmt::Debug for ProviderResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderResult")
            .field("ok", &self.ok)
            .field("provider", &self.provider)
            .field(
                "image_bytes",
                &self.image_bytes.as_ref().map(|b| format!("{} bytes", b.len())),
            )
            .field("mime_type", &self.mime_type)
            .field("error_code", &self.error_code)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct StorageResult {
    pub ok: bool,
    pub storage: String,
    pub url: Option<String>,
    pub error_code: Option<String>,
    pub error_message_safe: Option<String>,
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub content_type: String,
    /// Generic, industry-free description. Safe to persist.
    pub alt_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackInfo {
    pub used: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

/// Stage timings in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingsMs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decide: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<u64>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSuccess {
    /// Always `true`. Set by [`ImageEngineResult::success`].
    pub ok: bool,
    pub request_id: String,
    pub decision: Decision,
    pub image: ImageInfo,
    pub timings_ms: TimingsMs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationFailure {
    /// Always `false`. Set by [`ImageEngineResult::failure`].
    pub ok: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    pub fallback: FallbackInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub timings_ms: TimingsMs,
}

/// The response body: a union keyed by `ok`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageEngineResult {
    Success(GenerationSuccess),
    Failure(GenerationFailure),
}

impl ImageEngineResult {
    pub fn success(
        request_id: String,
        decision: Decision,
        image: ImageInfo,
        timings_ms: TimingsMs,
    ) -> Self {
        ImageEngineResult::Success(GenerationSuccess {
            ok: true,
            request_id,
            decision,
            image,
            timings_ms,
        })
    }

    pub fn failure(
        request_id: String,
        decision: Option<Decision>,
        reason: impl Into<String>,
        error: Option<ErrorInfo>,
        timings_ms: TimingsMs,
    ) -> Self {
        ImageEngineResult::Failure(GenerationFailure {
            ok: false,
            request_id,
            decision,
            fallback: FallbackInfo {
                used: true,
                reason: reason.into(),
            },
            error,
            timings_ms,
        })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ImageEngineResult::Success(_))
    }

    pub fn request_id(&self) -> &str {
        match self {
            ImageEngineResult::Success(s) => &s.request_id,
            ImageEngineResult::Failure(f) => &f.request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_from_camel_case() {
        let json = serde_json::json!({
            "requestId": "req-1",
            "consumerApp": "social_auto_poster",
            "platform": "instagram",
            "category": "promotion",
            "intentSummary": "Spring sale on house plants",
            "brand": { "name": "Leaf & Loam", "industry": "retail" },
            "allowTextOverlay": false,
            "safeMode": "strict"
        });
        let request: ImageEngineRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.platform, Platform::Instagram);
        assert_eq!(request.category, Category::Promotion);
        assert!(request.strict_mode());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn request_validation_rejects_empty_fields() {
        let mut request = ImageEngineRequest {
            request_id: "  ".to_string(),
            consumer_app: ConsumerApp::Other,
            platform: Platform::Blog,
            category: Category::Evergreen,
            intent_summary: "something".to_string(),
            brand: None,
            locale: None,
            allow_text_overlay: None,
            safe_mode: None,
        };
        assert!(request.validate().is_err());

        request.request_id = "req-1".to_string();
        request.intent_summary = String::new();
        assert!(request.validate().is_err());
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let json = serde_json::json!({
            "requestId": "req-1",
            "consumerApp": "social_auto_poster",
            "platform": "tiktok",
            "category": "promotion",
            "intentSummary": "x"
        });
        assert!(serde_json::from_value::<ImageEngineRequest>(json).is_err());
    }

    #[test]
    fn result_union_serializes_by_ok() {
        let failure = ImageEngineResult::failure(
            "req-1".to_string(),
            None,
            "no generation attempted",
            Some(ErrorInfo {
                code: "SAFETY_BLOCKED".to_string(),
                message: "blocked".to_string(),
            }),
            TimingsMs::default(),
        );
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["fallback"]["used"], true);
        assert_eq!(value["error"]["code"], "SAFETY_BLOCKED");
        assert!(value.get("image").is_none());

        // Round-trips back through the untagged union
        let parsed: ImageEngineResult = serde_json::from_value(value).unwrap();
        assert!(!parsed.is_ok());
    }
}
