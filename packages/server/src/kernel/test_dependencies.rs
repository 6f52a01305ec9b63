// TestDependencies - mock implementations for testing
//
// Provides mock adapters and sinks that can be injected into ServerDeps for
// tests. Mocks record every call so tests can assert on call counts and on
// what was (or was not) persisted.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Environment;
use crate::domains::image_engine::models::{ProviderResult, StorageResult};
use crate::kernel::deps::ServerDeps;
use crate::kernel::providers::ProviderRegistry;
use crate::kernel::storage::{StorageRegistry, StorageSelector, STORAGE_LOCAL};
use crate::kernel::traits::{
    BaseEventLog, BaseImageProvider, BaseImageStorage, BaseRequestStore, PipelineEvent,
    ProviderRequest, RequestRecord, StorageWrite,
};

// =============================================================================
// Mock Image Provider
// =============================================================================

pub struct MockImageProvider {
    responses: Arc<Mutex<Vec<ProviderResult>>>,
    fail_transport: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockImageProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            fail_transport: Arc::new(Mutex::new(false)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful generation with the given bytes.
    pub fn with_image(self, bytes: &[u8], mime_type: &str) -> Self {
        self.responses.lock().unwrap().push(ProviderResult {
            ok: true,
            provider: "mock".to_string(),
            image_bytes: Some(bytes.to_vec()),
            mime_type: Some(mime_type.to_string()),
            error_code: None,
            error_message_safe: None,
        });
        self
    }

    /// Queue a provider-reported rejection (ok:false result).
    pub fn with_rejection(self, error_code: &str) -> Self {
        self.responses.lock().unwrap().push(ProviderResult {
            ok: false,
            provider: "mock".to_string(),
            image_bytes: None,
            mime_type: None,
            error_code: Some(error_code.to_string()),
            error_message_safe: Some("Mock provider rejection".to_string()),
        });
        self
    }

    /// Make generate() return Err, simulating a transport fault.
    pub fn with_transport_error(self) -> Self {
        *self.fail_transport.lock().unwrap() = true;
        self
    }

    /// All requests the provider received.
    pub fn calls(&self) -> Vec<ProviderRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockImageProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseImageProvider for MockImageProvider {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResult> {
        self.calls.lock().unwrap().push(request.clone());

        if *self.fail_transport.lock().unwrap() {
            anyhow::bail!("mock transport failure");
        }

        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            Ok(responses.remove(0))
        } else {
            // Default: a tiny successful generation
            Ok(ProviderResult {
                ok: true,
                provider: "mock".to_string(),
                image_bytes: Some(b"mock-image-bytes".to_vec()),
                mime_type: Some("image/png".to_string()),
                error_code: None,
                error_message_safe: None,
            })
        }
    }
}

// =============================================================================
// Mock Image Storage
// =============================================================================

pub struct MockImageStorage {
    responses: Arc<Mutex<Vec<StorageResult>>>,
    fail_transport: Arc<Mutex<bool>>,
    writes: Arc<Mutex<Vec<StorageWrite>>>,
}

impl MockImageStorage {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            fail_transport: Arc::new(Mutex::new(false)),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a write failure with the given code (None for a code-less
    /// failure, which the orchestrator maps to STORAGE_ERROR).
    pub fn with_failure(self, error_code: Option<&str>) -> Self {
        self.responses.lock().unwrap().push(StorageResult {
            ok: false,
            storage: STORAGE_LOCAL.to_string(),
            url: None,
            error_code: error_code.map(|c| c.to_string()),
            error_message_safe: Some("Mock storage failure".to_string()),
        });
        self
    }

    /// Make write() return Err, simulating a transport fault.
    pub fn with_transport_error(self) -> Self {
        *self.fail_transport.lock().unwrap() = true;
        self
    }

    pub fn writes(&self) -> Vec<StorageWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl Default for MockImageStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseImageStorage for MockImageStorage {
    async fn write(&self, request: &StorageWrite) -> Result<StorageResult> {
        self.writes.lock().unwrap().push(request.clone());

        if *self.fail_transport.lock().unwrap() {
            anyhow::bail!("mock storage transport failure");
        }

        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            Ok(responses.remove(0))
        } else {
            Ok(StorageResult {
                ok: true,
                storage: STORAGE_LOCAL.to_string(),
                url: Some(format!("https://cdn.test/media/{}.png", request.request_id)),
                error_code: None,
                error_message_safe: None,
            })
        }
    }
}

// =============================================================================
// Mock Event Log
// =============================================================================

pub struct MockEventLog {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockEventLog {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Make append() fail, to verify the pipeline swallows log errors.
    pub fn with_failure(self) -> Self {
        *self.fail.lock().unwrap() = true;
        self
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.as_str())
            .collect()
    }
}

impl Default for MockEventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseEventLog for MockEventLog {
    async fn append(&self, event: &PipelineEvent) -> Result<()> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("mock event log failure");
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

// =============================================================================
// Mock Request Store
// =============================================================================

pub struct MockRequestStore {
    records: Arc<Mutex<Vec<RequestRecord>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockRequestStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Make upsert() fail, to verify the pipeline swallows persist errors.
    pub fn with_failure(self) -> Self {
        *self.fail.lock().unwrap() = true;
        self
    }

    /// All upserts in order (the store itself would keep only the last per
    /// request id).
    pub fn records(&self) -> Vec<RequestRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn last_for(&self, request_id: &str) -> Option<RequestRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.request_id == request_id)
            .cloned()
    }
}

impl Default for MockRequestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRequestStore for MockRequestStore {
    async fn upsert(&self, record: &RequestRecord) -> Result<()> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("mock request store failure");
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub openai: Arc<MockImageProvider>,
    pub nano_banana: Arc<MockImageProvider>,
    pub storage: Arc<MockImageStorage>,
    pub event_log: Arc<MockEventLog>,
    pub request_store: Arc<MockRequestStore>,
    pub environment: Environment,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            openai: Arc::new(MockImageProvider::new()),
            nano_banana: Arc::new(MockImageProvider::new()),
            storage: Arc::new(MockImageStorage::new()),
            event_log: Arc::new(MockEventLog::new()),
            request_store: Arc::new(MockRequestStore::new()),
            environment: Environment::Development,
        }
    }

    /// Set a mock for the primary (openai) provider
    pub fn mock_openai(mut self, provider: MockImageProvider) -> Self {
        self.openai = Arc::new(provider);
        self
    }

    /// Set a mock for the secondary (nano_banana) provider
    pub fn mock_nano_banana(mut self, provider: MockImageProvider) -> Self {
        self.nano_banana = Arc::new(provider);
        self
    }

    /// Set a mock storage backend (used for both registry slots)
    pub fn mock_storage(mut self, storage: MockImageStorage) -> Self {
        self.storage = Arc::new(storage);
        self
    }

    /// Set a mock event log
    pub fn mock_event_log(mut self, event_log: MockEventLog) -> Self {
        self.event_log = Arc::new(event_log);
        self
    }

    /// Set a mock request store
    pub fn mock_request_store(mut self, store: MockRequestStore) -> Self {
        self.request_store = Arc::new(store);
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Convert into ServerDeps for the pipeline and router.
    pub fn into_deps(self) -> Arc<ServerDeps> {
        Arc::new(ServerDeps::new(
            None,
            ProviderRegistry::new(self.openai.clone(), self.nano_banana.clone()),
            StorageRegistry::new(self.storage.clone(), self.storage.clone()),
            StorageSelector::new(self.environment),
            self.event_log.clone(),
            self.request_store.clone(),
        ))
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
