// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The pipeline stages that decide WHAT to generate are pure functions in the
// image_engine domain; these traits cover the effectful edges.
//
// Naming convention: Base* for trait names (e.g., BaseImageProvider)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domains::image_engine::models::{ProviderResult, StorageResult};

// =============================================================================
// Image Provider Trait (Infrastructure)
// =============================================================================

/// One provider call. Not `Serialize`: carries prompt text.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub request_id: String,
    pub width: u32,
    pub height: u32,
    pub prompt: String,
    pub negative_prompt: String,
}

/// A third-party image generation backend.
///
/// Single attempt, no internal retry or backoff. Ordinary provider-side
/// failures (quota, content rejection) come back as `ok: false` results;
/// an `Err` means a transport fault and is converted to `PROVIDER_ERROR`
/// by the orchestrator.
#[async_trait]
pub trait BaseImageProvider: Send + Sync {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResult>;
}

// =============================================================================
// Image Storage Trait (Infrastructure)
// =============================================================================

/// One storage write.
#[derive(Debug, Clone)]
pub struct StorageWrite {
    pub request_id: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

/// Destination for generated image bytes. Single attempt.
#[async_trait]
pub trait BaseImageStorage: Send + Sync {
    async fn write(&self, request: &StorageWrite) -> Result<StorageResult>;
}

// =============================================================================
// Event Log Trait (Infrastructure - best-effort)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineEventType {
    GenerateStart,
    ProviderCall,
    StorageWrite,
    GenerateFinish,
}

impl PipelineEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineEventType::GenerateStart => "generate_start",
            PipelineEventType::ProviderCall => "provider_call",
            PipelineEventType::StorageWrite => "storage_write",
            PipelineEventType::GenerateFinish => "generate_finish",
        }
    }
}

/// A pipeline milestone. Coarse fields only; no free text from the request
/// and never prompt text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub request_id: String,
    pub event_type: PipelineEventType,
    pub ok: Option<bool>,
    pub error_code: Option<String>,
}

impl PipelineEvent {
    pub fn start(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            event_type: PipelineEventType::GenerateStart,
            ok: None,
            error_code: None,
        }
    }

    pub fn provider_call(request_id: &str, ok: bool, error_code: Option<String>) -> Self {
        Self {
            request_id: request_id.to_string(),
            event_type: PipelineEventType::ProviderCall,
            ok: Some(ok),
            error_code,
        }
    }

    pub fn storage_write(request_id: &str, ok: bool, error_code: Option<String>) -> Self {
        Self {
            request_id: request_id.to_string(),
            event_type: PipelineEventType::StorageWrite,
            ok: Some(ok),
            error_code,
        }
    }

    pub fn finish(request_id: &str, ok: bool) -> Self {
        Self {
            request_id: request_id.to_string(),
            event_type: PipelineEventType::GenerateFinish,
            ok: Some(ok),
            error_code: None,
        }
    }
}

/// Append-only pipeline event log.
///
/// `log_safe` is the orchestrator-facing entry point: it catches and
/// discards failures so logging can never affect the response.
#[async_trait]
pub trait BaseEventLog: Send + Sync {
    async fn append(&self, event: &PipelineEvent) -> Result<()>;

    async fn log_safe(&self, event: &PipelineEvent) {
        if let Err(e) = self.append(event).await {
            tracing::warn!(
                request_id = %event.request_id,
                event_type = event.event_type.as_str(),
                error = %e,
                "Event log append failed (ignored)"
            );
        }
    }
}

// =============================================================================
// Request Store Trait (Infrastructure - best-effort)
// =============================================================================

/// Terminal outcome of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Image generated and stored.
    Ok,
    /// Generation deliberately skipped; caller uses a substitute asset.
    Fallback,
    /// Generation never attempted (safety block).
    Skipped,
    /// Provider or storage failure.
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Ok => "ok",
            RecordStatus::Fallback => "fallback",
            RecordStatus::Skipped => "skipped",
            RecordStatus::Error => "error",
        }
    }
}

/// The record upserted per request id. Holds only derived fields — never
/// prompt text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    pub request_id: String,
    pub consumer_app: String,
    pub platform: String,
    pub category: String,
    pub status: RecordStatus,
    pub error_code: Option<String>,
    pub fallback_reason: Option<String>,
    pub image_url: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub content_type: Option<String>,
    pub alt_text: Option<String>,
    pub timings_ms: serde_json::Value,
}

/// Upsert sink for terminal outcome records, keyed by request id.
/// Last write wins; the id is idempotent-intent, not a serialization key.
#[async_trait]
pub trait BaseRequestStore: Send + Sync {
    async fn upsert(&self, record: &RequestRecord) -> Result<()>;

    async fn persist_safe(&self, record: &RequestRecord) {
        if let Err(e) = self.upsert(record).await {
            tracing::warn!(
                request_id = %record.request_id,
                status = record.status.as_str(),
                error = %e,
                "Request record upsert failed (ignored)"
            );
        }
    }
}
