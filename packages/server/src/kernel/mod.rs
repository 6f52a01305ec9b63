//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod event_log;
pub mod providers;
pub mod request_store;
pub mod storage;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use event_log::PgEventLog;
pub use providers::{NanoBananaProvider, OpenAiProvider, ProviderRegistry};
pub use request_store::PgRequestStore;
pub use storage::{
    BlobStorage, LocalDiskStorage, StorageBackend, StorageRegistry, StorageSelector,
};
pub use test_dependencies::TestDependencies;
pub use traits::*;
