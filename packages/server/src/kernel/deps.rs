//! Server dependencies for effects (using traits for testability)
//!
//! This module provides the central dependency container the pipeline runs
//! against. All external services use trait abstractions to enable testing.

use std::sync::Arc;

use sqlx::PgPool;

use crate::kernel::providers::ProviderRegistry;
use crate::kernel::storage::{StorageRegistry, StorageSelector};
use crate::kernel::traits::{BaseEventLog, BaseRequestStore};

/// Server dependencies accessible to the pipeline (using traits for
/// testability)
#[derive(Clone)]
pub struct ServerDeps {
    /// Present when a database is configured; the health endpoint reports
    /// its state. The event log and request store hold their own handles.
    pub db_pool: Option<PgPool>,
    pub providers: ProviderRegistry,
    pub storage: StorageRegistry,
    pub storage_selector: StorageSelector,
    pub event_log: Arc<dyn BaseEventLog>,
    pub request_store: Arc<dyn BaseRequestStore>,
}

impl ServerDeps {
    pub fn new(
        db_pool: Option<PgPool>,
        providers: ProviderRegistry,
        storage: StorageRegistry,
        storage_selector: StorageSelector,
        event_log: Arc<dyn BaseEventLog>,
        request_store: Arc<dyn BaseRequestStore>,
    ) -> Self {
        Self {
            db_pool,
            providers,
            storage,
            storage_selector,
            event_log,
            request_store,
        }
    }
}
