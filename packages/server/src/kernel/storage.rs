// Storage backends for generated image bytes.
//
// Backend choice is environment-driven and fixed per deployment: local disk
// in development, a durable blob store over HTTP in production. The selector
// is built once from explicit config so tests can inject either backend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::config::Environment;
use crate::domains::image_engine::models::StorageResult;
use crate::kernel::traits::{BaseImageStorage, StorageWrite};

pub const STORAGE_LOCAL: &str = "local";
pub const STORAGE_BLOB: &str = "blob";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    Blob,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Local => STORAGE_LOCAL,
            StorageBackend::Blob => STORAGE_BLOB,
        }
    }
}

/// Picks the backend for a deployment. Evaluated once per request from
/// explicit configuration, never from ambient process state.
#[derive(Debug, Clone, Copy)]
pub struct StorageSelector {
    environment: Environment,
}

impl StorageSelector {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn select(&self) -> StorageBackend {
        match self.environment {
            Environment::Production => StorageBackend::Blob,
            Environment::Development => StorageBackend::Local,
        }
    }
}

/// File extension for a mime type. Unknown types store as png, matching the
/// pipeline's content-type default.
fn extension_for(mime_type: Option<&str>) -> &'static str {
    match mime_type {
        Some("image/jpeg") | Some("image/jpg") => "jpg",
        Some("image/webp") => "webp",
        _ => "png",
    }
}

/// Content-addressed object key: request id plus a short digest of the
/// bytes, so a re-run with different output gets a distinct key.
pub fn storage_key(request_id: &str, bytes: &[u8], mime_type: Option<&str>) -> String {
    let digest = Sha256::digest(bytes);
    format!(
        "{}-{}.{}",
        request_id,
        &hex::encode(digest)[..12],
        extension_for(mime_type)
    )
}

// =============================================================================
// Local disk backend
// =============================================================================

/// Writes under a media directory served by the HTTP layer at `/media`.
pub struct LocalDiskStorage {
    media_dir: PathBuf,
    base_url: String,
}

impl LocalDiskStorage {
    pub fn new(media_dir: PathBuf, base_url: impl Into<String>) -> Self {
        Self {
            media_dir,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BaseImageStorage for LocalDiskStorage {
    async fn write(&self, request: &StorageWrite) -> Result<StorageResult> {
        let key = storage_key(
            &request.request_id,
            &request.bytes,
            request.mime_type.as_deref(),
        );

        tokio::fs::create_dir_all(&self.media_dir)
            .await
            .context("Failed to create media directory")?;
        let path = self.media_dir.join(&key);
        tokio::fs::write(&path, &request.bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", path.display()))?;

        tracing::debug!(key = %key, bytes = request.bytes.len(), "Stored image locally");

        Ok(StorageResult {
            ok: true,
            storage: STORAGE_LOCAL.to_string(),
            url: Some(format!("{}/{}", self.base_url.trim_end_matches('/'), key)),
            error_code: None,
            error_message_safe: None,
        })
    }
}

// =============================================================================
// Durable blob backend
// =============================================================================

/// PUTs objects to an S3-compatible blob endpoint with bearer auth.
pub struct BlobStorage {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BlobStorage {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }
}

#[async_trait]
impl BaseImageStorage for BlobStorage {
    async fn write(&self, request: &StorageWrite) -> Result<StorageResult> {
        let key = storage_key(
            &request.request_id,
            &request.bytes,
            request.mime_type.as_deref(),
        );
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), key);

        let mut builder = self
            .http_client
            .put(&url)
            .header(
                "Content-Type",
                request.mime_type.as_deref().unwrap_or("image/png"),
            )
            .body(request.bytes.clone());
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        // Transport faults propagate as Err; the orchestrator folds them
        // into STORAGE_ERROR.
        let response = builder
            .send()
            .await
            .context("Blob store request failed")?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, key = %key, "Blob store rejected write");
            return Ok(StorageResult {
                ok: false,
                storage: STORAGE_BLOB.to_string(),
                url: None,
                error_code: Some("BLOB_WRITE_FAILED".to_string()),
                error_message_safe: Some("The image could not be stored.".to_string()),
            });
        }

        tracing::debug!(key = %key, bytes = request.bytes.len(), "Stored image in blob store");

        Ok(StorageResult {
            ok: true,
            storage: STORAGE_BLOB.to_string(),
            url: Some(url),
            error_code: None,
            error_message_safe: None,
        })
    }
}

// =============================================================================
// Storage registry
// =============================================================================

#[derive(Clone)]
pub struct StorageRegistry {
    local: Arc<dyn BaseImageStorage>,
    blob: Arc<dyn BaseImageStorage>,
}

impl StorageRegistry {
    pub fn new(local: Arc<dyn BaseImageStorage>, blob: Arc<dyn BaseImageStorage>) -> Self {
        Self { local, blob }
    }

    pub fn get(&self, backend: StorageBackend) -> Arc<dyn BaseImageStorage> {
        match backend {
            StorageBackend::Local => self.local.clone(),
            StorageBackend::Blob => self.blob.clone(),
        }
    }
}
