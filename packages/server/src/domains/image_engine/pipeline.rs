//! Pipeline orchestrator.
//!
//! Composes the pure stages (decide, safety, prompt, size) with the
//! effectful adapters (provider, storage) and the best-effort sinks (event
//! log, request store) into one request/response cycle.
//!
//! Contract: for any validated request this function returns a structured
//! `ImageEngineResult` — it never propagates an error to the HTTP layer.
//! Every terminal branch persists an outcome record and logs a
//! `generate_finish` event before returning; sink failures are swallowed
//! and never change the response.

use std::time::Instant;

use super::decision;
use super::models::{
    DecisionMode, ErrorInfo, ImageEngineRequest, ImageEngineResult, ImageInfo, StorageResult,
    TimingsMs, Verdict,
};
use super::prompt;
use super::safety::{self, SafetyInput};
use super::sizes;
use crate::kernel::{
    PipelineEvent, ProviderRequest, RecordStatus, RequestRecord, ServerDeps, StorageWrite,
};

pub const ERROR_SAFETY_BLOCKED: &str = "SAFETY_BLOCKED";
pub const ERROR_PROVIDER: &str = "PROVIDER_ERROR";
pub const ERROR_STORAGE: &str = "STORAGE_ERROR";

const DEFAULT_FALLBACK_REASON: &str =
    "Image generation is unavailable for this request; use a stock asset instead.";

fn ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

fn join_reasons(reasons: &[String]) -> String {
    if reasons.is_empty() {
        DEFAULT_FALLBACK_REASON.to_string()
    } else {
        reasons.join(" ")
    }
}

/// Generic, industry-free alt text. Safe to persist.
fn alt_text(request: &ImageEngineRequest) -> String {
    let subject = match request.category {
        super::models::Category::Educational => "educational announcement",
        super::models::Category::Promotion => "promotional",
        super::models::Category::SocialProof => "customer review",
        super::models::Category::LocalAbstract => "local event",
        super::models::Category::Evergreen => "brand",
    };
    format!(
        "Abstract {} background image for {}",
        subject,
        request.platform.display_name()
    )
}

/// Run the full pipeline for one validated request.
pub async fn run_pipeline(deps: &ServerDeps, request: &ImageEngineRequest) -> ImageEngineResult {
    let started = Instant::now();
    let request_id = request.request_id.clone();

    deps.event_log
        .log_safe(&PipelineEvent::start(&request_id))
        .await;

    // Decide
    let decide_started = Instant::now();
    let decision = decision::decide(request);
    let mut timings = TimingsMs {
        decide: Some(ms(decide_started)),
        ..Default::default()
    };

    // Re-evaluate safety against the decision outputs and raw request hints,
    // so calling this endpoint standalone is always safe. Runs before the
    // decision-fallback check: a block verdict outranks a fallback routing.
    let safety_result = safety::evaluate(&SafetyInput {
        platform: decision.platform,
        category: decision.category,
        aspect: decision.aspect,
        mode: decision.mode,
        negative_rules: &decision.prompt_plan.negative_rules,
        business_name: request.brand.as_ref().and_then(|b| b.name.as_deref()),
        user_text: Some(&request.intent_summary),
        strict: request.strict_mode(),
    });

    match safety_result.verdict {
        Verdict::Block => {
            let reason = safety_result
                .reason_safe
                .clone()
                .unwrap_or_else(|| "This request cannot be completed.".to_string());
            timings.total = ms(started);
            let result = ImageEngineResult::failure(
                request_id,
                Some(decision),
                reason.clone(),
                Some(ErrorInfo {
                    code: ERROR_SAFETY_BLOCKED.to_string(),
                    message: reason,
                }),
                timings,
            );
            finish(deps, request, &result, RecordStatus::Skipped).await;
            return result;
        }
        Verdict::Fallback => {
            // Prefer the decision's own routing reasons when it already
            // chose fallback; the evaluator's reason is generic there.
            let reason = if decision.mode == DecisionMode::Fallback
                && !decision.safety.reasons.is_empty()
            {
                join_reasons(&decision.safety.reasons)
            } else {
                safety_result
                    .reason_safe
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FALLBACK_REASON.to_string())
            };
            timings.total = ms(started);
            let result =
                ImageEngineResult::failure(request_id, Some(decision), reason, None, timings);
            finish(deps, request, &result, RecordStatus::Fallback).await;
            return result;
        }
        Verdict::Allow => {}
    }

    // Build prompt (in-memory only) and resolve canvas
    let bundle = prompt::build_prompt(&decision, &safety_result, request.brand.as_ref());
    let (width, height) = sizes::resolve_size(decision.platform, decision.aspect);

    // Call provider — exactly one attempt
    let (provider_id, provider) = deps.providers.resolve(&decision.provider_plan.provider_id);
    let provider_request = ProviderRequest {
        request_id: request_id.clone(),
        width,
        height,
        prompt: bundle.prompt,
        negative_prompt: bundle.negative_prompt,
    };

    let provider_started = Instant::now();
    let provider_result = match provider.generate(&provider_request).await {
        Ok(result) => result,
        Err(e) => {
            // Transport fault at the adapter boundary
            timings.provider = Some(ms(provider_started));
            tracing::warn!(
                request_id = %request_id,
                provider = provider_id,
                error = %e,
                "Provider call failed"
            );
            deps.event_log
                .log_safe(&PipelineEvent::provider_call(
                    &request_id,
                    false,
                    Some(ERROR_PROVIDER.to_string()),
                ))
                .await;
            timings.total = ms(started);
            let result = ImageEngineResult::failure(
                request_id,
                Some(decision),
                "The image provider was unavailable; use a stock asset instead.",
                Some(ErrorInfo {
                    code: ERROR_PROVIDER.to_string(),
                    message: "The image provider was unavailable.".to_string(),
                }),
                timings,
            );
            finish(deps, request, &result, RecordStatus::Error).await;
            return result;
        }
    };
    timings.provider = Some(ms(provider_started));

    deps.event_log
        .log_safe(&PipelineEvent::provider_call(
            &request_id,
            provider_result.ok,
            provider_result.error_code.clone(),
        ))
        .await;

    let image_bytes = match provider_result.image_bytes {
        Some(bytes) if provider_result.ok => bytes,
        _ => {
            let code = provider_result
                .error_code
                .clone()
                .unwrap_or_else(|| ERROR_PROVIDER.to_string());
            let message = provider_result
                .error_message_safe
                .clone()
                .unwrap_or_else(|| {
                    "The image provider could not complete this request.".to_string()
                });
            timings.total = ms(started);
            let result = ImageEngineResult::failure(
                request_id,
                Some(decision),
                message.clone(),
                Some(ErrorInfo { code, message }),
                timings,
            );
            finish(deps, request, &result, RecordStatus::Error).await;
            return result;
        }
    };

    // Write to the environment-selected storage backend
    let backend = deps.storage_selector.select();
    let storage = deps.storage.get(backend);
    let storage_started = Instant::now();
    let storage_result = match storage
        .write(&StorageWrite {
            request_id: request_id.clone(),
            bytes: image_bytes,
            mime_type: provider_result.mime_type.clone(),
        })
        .await
    {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                storage = backend.as_str(),
                error = %e,
                "Storage write failed"
            );
            StorageResult {
                ok: false,
                storage: backend.as_str().to_string(),
                url: None,
                error_code: None,
                error_message_safe: None,
            }
        }
    };
    timings.storage = Some(ms(storage_started));

    deps.event_log
        .log_safe(&PipelineEvent::storage_write(
            &request_id,
            storage_result.ok,
            storage_result.error_code.clone(),
        ))
        .await;

    let url = match storage_result.url {
        Some(url) if storage_result.ok => url,
        _ => {
            let code = storage_result
                .error_code
                .clone()
                .unwrap_or_else(|| ERROR_STORAGE.to_string());
            let message = storage_result
                .error_message_safe
                .clone()
                .unwrap_or_else(|| "The generated image could not be stored.".to_string());
            timings.total = ms(started);
            let result = ImageEngineResult::failure(
                request_id,
                Some(decision),
                message.clone(),
                Some(ErrorInfo { code, message }),
                timings,
            );
            finish(deps, request, &result, RecordStatus::Error).await;
            return result;
        }
    };

    // Success
    let content_type = provider_result
        .mime_type
        .clone()
        .unwrap_or_else(|| "image/png".to_string());
    timings.total = ms(started);
    let image = ImageInfo {
        url,
        width,
        height,
        content_type,
        alt_text: alt_text(request),
    };
    let result = ImageEngineResult::success(request_id, decision, image, timings);
    finish(deps, request, &result, RecordStatus::Ok).await;
    result
}

/// Terminal side effects: upsert the outcome record, then log
/// generate_finish. Both best-effort.
async fn finish(
    deps: &ServerDeps,
    request: &ImageEngineRequest,
    result: &ImageEngineResult,
    status: RecordStatus,
) {
    deps.request_store
        .persist_safe(&record_from(request, result, status))
        .await;
    deps.event_log
        .log_safe(&PipelineEvent::finish(result.request_id(), result.is_ok()))
        .await;
}

fn record_from(
    request: &ImageEngineRequest,
    result: &ImageEngineResult,
    status: RecordStatus,
) -> RequestRecord {
    let (error_code, fallback_reason, image, timings) = match result {
        ImageEngineResult::Success(s) => (None, None, Some(&s.image), &s.timings_ms),
        ImageEngineResult::Failure(f) => (
            f.error.as_ref().map(|e| e.code.clone()),
            Some(f.fallback.reason.clone()),
            None,
            &f.timings_ms,
        ),
    };

    RequestRecord {
        request_id: result.request_id().to_string(),
        consumer_app: request.consumer_app.as_str().to_string(),
        platform: request.platform.as_str().to_string(),
        category: request.category.as_str().to_string(),
        status,
        error_code,
        fallback_reason,
        image_url: image.map(|i| i.url.clone()),
        width: image.map(|i| i.width as i32),
        height: image.map(|i| i.height as i32),
        content_type: image.map(|i| i.content_type.clone()),
        alt_text: image.map(|i| i.alt_text.clone()),
        timings_ms: serde_json::to_value(timings).unwrap_or(serde_json::Value::Null),
    }
}
