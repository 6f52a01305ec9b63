//! HTTP application assembly.
//!
//! `build_router` takes an already-constructed dependency container so the
//! route tests can swap in mocks; `build_app` wires the real adapters from
//! configuration.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use image_client::{GeminiImageClient, OpenAiImageClient};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{Config, Environment};
use crate::kernel::event_log::PgEventLog;
use crate::kernel::providers::{NanoBananaProvider, OpenAiProvider, ProviderRegistry};
use crate::kernel::request_store::PgRequestStore;
use crate::kernel::storage::{BlobStorage, LocalDiskStorage, StorageRegistry, StorageSelector};
use crate::kernel::traits::BaseImageStorage;
use crate::kernel::ServerDeps;
use crate::server::routes::{generate_handler, health_handler};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the router around a dependency container.
///
/// `media_dir` enables the static file service for locally stored images;
/// production deployments serve media from the blob store instead.
pub fn build_router(deps: Arc<ServerDeps>, media_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let mut router = Router::new()
        .route("/api/image-engine/generate", post(generate_handler))
        .route("/health", get(health_handler));

    if let Some(dir) = media_dir {
        router = router.nest_service("/media", ServeDir::new(dir));
    }

    router
        .layer(Extension(AppState { deps }))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Wire the production dependency graph from configuration.
pub fn build_app(config: &Config, pool: PgPool) -> Router {
    let openai_client = Arc::new(OpenAiImageClient::new(config.openai_api_key.clone()));
    let gemini_client = Arc::new(GeminiImageClient::new(config.gemini_api_key.clone()));
    let providers = ProviderRegistry::new(
        Arc::new(OpenAiProvider::new(openai_client)),
        Arc::new(NanoBananaProvider::new(gemini_client)),
    );

    let local: Arc<dyn BaseImageStorage> = Arc::new(LocalDiskStorage::new(
        config.media_dir.clone(),
        config.media_base_url.clone(),
    ));
    // Development without a blob store configured falls back to local disk;
    // Config::from_env rejects that combination in production.
    let blob: Arc<dyn BaseImageStorage> = match &config.blob_store_url {
        Some(url) => Arc::new(BlobStorage::new(url.clone(), config.blob_store_token.clone())),
        None => local.clone(),
    };
    let storage = StorageRegistry::new(local, blob);

    let deps = Arc::new(ServerDeps::new(
        Some(pool.clone()),
        providers,
        storage,
        StorageSelector::new(config.environment),
        Arc::new(PgEventLog::new(pool.clone())),
        Arc::new(PgRequestStore::new(pool)),
    ));

    let media_dir = match config.environment {
        Environment::Development => Some(config.media_dir.clone()),
        Environment::Production => None,
    };

    build_router(deps, media_dir)
}
