//! End-to-end pipeline tests against mock adapters.
//!
//! These cover the full orchestration contract: terminal branch selection,
//! event trail shape, outcome records, and the guarantee that prompt text
//! never reaches a sink.

mod common;

use common::{request, request_with_brand, strict};
use engine_core::domains::image_engine::models::{Category, ImageEngineResult, Platform};
use engine_core::domains::image_engine::pipeline::run_pipeline;
use engine_core::kernel::test_dependencies::{
    MockEventLog, MockImageProvider, MockImageStorage, MockRequestStore, TestDependencies,
};
use engine_core::kernel::RecordStatus;

// =============================================================================
// Success path
// =============================================================================

#[tokio::test]
async fn promotion_on_instagram_generates_portrait_image() {
    let deps = TestDependencies::new();
    let openai = deps.openai.clone();
    let nano_banana = deps.nano_banana.clone();
    let event_log = deps.event_log.clone();
    let store = deps.request_store.clone();

    let req = request(
        "req-1",
        Platform::Instagram,
        Category::Promotion,
        "autumn flash sale on handmade ceramics",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;

    let success = match result {
        ImageEngineResult::Success(s) => s,
        ImageEngineResult::Failure(f) => panic!("expected success, got {:?}", f.error),
    };
    assert!(success.ok);
    assert_eq!(success.request_id, "req-1");
    // Instagram promotion defaults to portrait
    assert_eq!(success.image.width, 1080);
    assert_eq!(success.image.height, 1350);
    assert!(success.image.url.starts_with("https://cdn.test/media/"));
    assert_eq!(success.image.content_type, "image/png");

    // Promotion routes to the primary provider, exactly one attempt
    assert_eq!(openai.call_count(), 1);
    assert_eq!(nano_banana.call_count(), 0);

    assert_eq!(
        event_log.event_types(),
        vec![
            "generate_start",
            "provider_call",
            "storage_write",
            "generate_finish"
        ]
    );

    let record = store.last_for("req-1").unwrap();
    assert_eq!(record.status, RecordStatus::Ok);
    assert_eq!(record.image_url, Some(success.image.url.clone()));
    assert_eq!(record.error_code, None);
}

#[tokio::test]
async fn evergreen_routes_to_secondary_provider() {
    let deps = TestDependencies::new();
    let openai = deps.openai.clone();
    let nano_banana = deps.nano_banana.clone();

    let req = request(
        "req-evergreen",
        Platform::Facebook,
        Category::Evergreen,
        "calm seasonal texture for our page header",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;

    assert!(result.is_ok());
    assert_eq!(openai.call_count(), 0);
    assert_eq!(nano_banana.call_count(), 1);
}

// =============================================================================
// Safety block
// =============================================================================

#[tokio::test]
async fn blocked_content_never_reaches_the_provider() {
    let deps = TestDependencies::new();
    let openai = deps.openai.clone();
    let nano_banana = deps.nano_banana.clone();
    let event_log = deps.event_log.clone();
    let store = deps.request_store.clone();

    let req = request(
        "req-blocked",
        Platform::Instagram,
        Category::Promotion,
        "dramatic scene with weapons and explosions",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;

    let failure = match result {
        ImageEngineResult::Failure(f) => f,
        ImageEngineResult::Success(_) => panic!("expected failure"),
    };
    assert!(!failure.ok);
    assert!(failure.fallback.used);
    let error = failure.error.expect("block carries an error");
    assert_eq!(error.code, "SAFETY_BLOCKED");

    // No provider or storage activity at all
    assert_eq!(openai.call_count(), 0);
    assert_eq!(nano_banana.call_count(), 0);
    assert_eq!(
        event_log.event_types(),
        vec!["generate_start", "generate_finish"]
    );

    let record = store.last_for("req-blocked").unwrap();
    assert_eq!(record.status, RecordStatus::Skipped);
    assert_eq!(record.error_code, Some("SAFETY_BLOCKED".to_string()));
    assert_eq!(record.image_url, None);
}

#[tokio::test]
async fn blocked_business_name_blocks_generation() {
    let deps = TestDependencies::new();
    let openai = deps.openai.clone();

    let req = request_with_brand(
        "req-brand-block",
        Platform::Facebook,
        Category::Evergreen,
        "grand opening announcement",
        "Firearm Depot",
        "retail",
        "bold",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;

    assert!(!result.is_ok());
    assert_eq!(openai.call_count(), 0);
}

// =============================================================================
// Fallback paths (no error field)
// =============================================================================

#[tokio::test]
async fn unsupported_combination_falls_back_without_error() {
    let deps = TestDependencies::new();
    let openai = deps.openai.clone();
    let nano_banana = deps.nano_banana.clone();
    let store = deps.request_store.clone();

    // Google Business Profile has no social proof surface
    let req = request(
        "req-unsupported",
        Platform::GoogleBusinessProfile,
        Category::SocialProof,
        "share our latest five star review",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;

    let failure = match result {
        ImageEngineResult::Failure(f) => f,
        ImageEngineResult::Success(_) => panic!("expected fallback"),
    };
    assert!(failure.fallback.used);
    assert!(!failure.fallback.reason.is_empty());
    // A deliberate fallback is not an error
    assert!(failure.error.is_none());

    assert_eq!(openai.call_count(), 0);
    assert_eq!(nano_banana.call_count(), 0);
    let record = store.last_for("req-unsupported").unwrap();
    assert_eq!(record.status, RecordStatus::Fallback);
    assert_eq!(record.error_code, None);
}

#[tokio::test]
async fn strict_mode_widens_fallback_rules() {
    // Without strict mode this intent generates
    let relaxed_deps = TestDependencies::new();
    let req = request(
        "req-wine-relaxed",
        Platform::Instagram,
        Category::Promotion,
        "wine tasting night this friday",
    );
    assert!(run_pipeline(&relaxed_deps.into_deps(), &req).await.is_ok());

    // With strict mode the same intent falls back
    let strict_deps = TestDependencies::new();
    let req = strict(request(
        "req-wine-strict",
        Platform::Instagram,
        Category::Promotion,
        "wine tasting night this friday",
    ));
    let result = run_pipeline(&strict_deps.into_deps(), &req).await;
    match result {
        ImageEngineResult::Failure(f) => {
            assert!(f.fallback.used);
            assert!(f.error.is_none());
        }
        ImageEngineResult::Success(_) => panic!("strict mode should fall back"),
    }
}

// =============================================================================
// Provider failures
// =============================================================================

#[tokio::test]
async fn provider_transport_fault_maps_to_provider_error() {
    let deps =
        TestDependencies::new().mock_openai(MockImageProvider::new().with_transport_error());
    let event_log = deps.event_log.clone();
    let store = deps.request_store.clone();

    let req = request(
        "req-transport",
        Platform::X,
        Category::Promotion,
        "limited time offer on annual plans",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;

    let failure = match result {
        ImageEngineResult::Failure(f) => f,
        ImageEngineResult::Success(_) => panic!("expected failure"),
    };
    let error = failure.error.expect("transport fault carries an error");
    assert_eq!(error.code, "PROVIDER_ERROR");
    assert!(failure.timings_ms.provider.is_some());

    // The failed call is still logged, but no storage write happens
    assert_eq!(
        event_log.event_types(),
        vec!["generate_start", "provider_call", "generate_finish"]
    );
    let record = store.last_for("req-transport").unwrap();
    assert_eq!(record.status, RecordStatus::Error);
}

#[tokio::test]
async fn provider_rejection_code_passes_through() {
    let deps = TestDependencies::new()
        .mock_openai(MockImageProvider::new().with_rejection("CONTENT_REJECTED"));

    let req = request(
        "req-rejected",
        Platform::Facebook,
        Category::Promotion,
        "weekend brunch special",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;

    match result {
        ImageEngineResult::Failure(f) => {
            assert_eq!(f.error.unwrap().code, "CONTENT_REJECTED");
        }
        ImageEngineResult::Success(_) => panic!("expected failure"),
    }
}

// =============================================================================
// Storage failures
// =============================================================================

#[tokio::test]
async fn storage_failure_code_passes_through() {
    let deps = TestDependencies::new()
        .mock_storage(MockImageStorage::new().with_failure(Some("BLOB_WRITE_FAILED")));
    let event_log = deps.event_log.clone();
    let store = deps.request_store.clone();

    let req = request(
        "req-storage",
        Platform::Blog,
        Category::Educational,
        "how to repot succulents",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;

    let failure = match result {
        ImageEngineResult::Failure(f) => f,
        ImageEngineResult::Success(_) => panic!("expected failure"),
    };
    assert_eq!(failure.error.unwrap().code, "BLOB_WRITE_FAILED");

    // The generated image was abandoned, and the finish event still fired
    assert_eq!(
        event_log.event_types(),
        vec![
            "generate_start",
            "provider_call",
            "storage_write",
            "generate_finish"
        ]
    );
    let record = store.last_for("req-storage").unwrap();
    assert_eq!(record.status, RecordStatus::Error);
    assert_eq!(record.image_url, None);
}

#[tokio::test]
async fn storage_transport_fault_maps_to_storage_error() {
    let deps =
        TestDependencies::new().mock_storage(MockImageStorage::new().with_transport_error());

    let req = request(
        "req-storage-transport",
        Platform::Blog,
        Category::Educational,
        "five tips for sourdough starters",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;

    match result {
        ImageEngineResult::Failure(f) => {
            assert_eq!(f.error.unwrap().code, "STORAGE_ERROR");
        }
        ImageEngineResult::Success(_) => panic!("expected failure"),
    }
}

// =============================================================================
// Best-effort sinks
// =============================================================================

#[tokio::test]
async fn sink_failures_never_change_the_response() {
    let deps = TestDependencies::new()
        .mock_event_log(MockEventLog::new().with_failure())
        .mock_request_store(MockRequestStore::new().with_failure());

    let req = request(
        "req-sinks-down",
        Platform::Instagram,
        Category::Evergreen,
        "soft gradient background for quotes",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;

    assert!(result.is_ok());
}

// =============================================================================
// Prompt containment
// =============================================================================

#[tokio::test]
async fn prompt_text_never_reaches_events_or_records() {
    let deps = TestDependencies::new();
    let openai = deps.openai.clone();
    let event_log = deps.event_log.clone();
    let store = deps.request_store.clone();

    let req = request_with_brand(
        "req-containment",
        Platform::Instagram,
        Category::Promotion,
        "midnight velvet sale on silk scarves",
        "Atelier Moth",
        "fashion boutique",
        "luxury and elegant",
    );
    let result = run_pipeline(&deps.into_deps(), &req).await;
    assert!(result.is_ok());

    let calls = openai.calls();
    assert_eq!(calls.len(), 1);
    let prompt = &calls[0].prompt;
    let negative = &calls[0].negative_prompt;
    assert!(!prompt.is_empty());
    assert!(!negative.is_empty());

    // Events and records are serializable sinks; the prompt pair must not
    // appear anywhere in them.
    let events_json = serde_json::to_string(&event_log.events()).unwrap();
    let records_json = serde_json::to_string(&store.records()).unwrap();
    assert!(!events_json.contains(prompt));
    assert!(!events_json.contains(negative));
    assert!(!records_json.contains(prompt));
    assert!(!records_json.contains(negative));

    // Neither does the response body
    let response_json = serde_json::to_string(&result).unwrap();
    assert!(!response_json.contains(prompt));
    assert!(!response_json.contains(negative));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_requests_do_not_cross_talk() {
    let deps = TestDependencies::new();
    let store = deps.request_store.clone();
    let shared = deps.into_deps();

    let req_a = request(
        "req-concurrent-a",
        Platform::Instagram,
        Category::Promotion,
        "two for one smoothie tuesday",
    );
    let req_b = request(
        "req-concurrent-b",
        Platform::Blog,
        Category::Educational,
        "guide to composting at home",
    );

    let (result_a, result_b) =
        tokio::join!(run_pipeline(&shared, &req_a), run_pipeline(&shared, &req_b));

    assert_eq!(result_a.request_id(), "req-concurrent-a");
    assert_eq!(result_b.request_id(), "req-concurrent-b");
    assert!(result_a.is_ok());
    assert!(result_b.is_ok());

    let record_a = store.last_for("req-concurrent-a").unwrap();
    let record_b = store.last_for("req-concurrent-b").unwrap();
    assert_eq!(record_a.platform, "instagram");
    assert_eq!(record_b.platform, "blog");
}
