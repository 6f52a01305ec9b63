//! POST /api/image-engine/generate
//!
//! The single pipeline entry point. Contract: a request that parses gets
//! HTTP 200 with an `ImageEngineResult` union body — callers branch on `ok`,
//! not on status. Only malformed bodies get a 400.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domains::image_engine::models::ImageEngineRequest;
use crate::domains::image_engine::pipeline::run_pipeline;
use crate::server::app::AppState;

pub async fn generate_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ImageEngineRequest>, JsonRejection>,
) -> Response {
    // Validation failures never enter the pipeline
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.body_text() })),
            )
                .into_response();
        }
    };

    if let Err(message) = request.validate() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response();
    }

    tracing::info!(
        request_id = %request.request_id,
        consumer_app = request.consumer_app.as_str(),
        platform = request.platform.as_str(),
        category = request.category.as_str(),
        "Image generation requested"
    );

    let result = run_pipeline(&state.deps, &request).await;

    tracing::info!(
        request_id = result.request_id(),
        ok = result.is_ok(),
        "Image generation finished"
    );

    (StatusCode::OK, Json(result)).into_response()
}
