//! Storage Module
//!
//! The origin-scoped key-value store the account data lives in, with a
//! volatile and a file-backed implementation.

pub mod file;
pub mod memory;
pub mod types;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use types::{snapshot, KeyValueStore, StorageError, StorageResult, StoreHandle};

use crate::config::{StorageBackend, StorageConfig};
use std::sync::Arc;
use tracing::info;

/// Build the backend selected in the configuration
pub fn open_store(config: &StorageConfig) -> StoreHandle {
    // 0 disables the quota
    let quota = config.quota_bytes.filter(|q| *q > 0);
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage, nothing will persist past this process");
            match quota {
                Some(quota) => Arc::new(MemoryStore::with_quota(quota)),
                None => Arc::new(MemoryStore::new()),
            }
        }
        StorageBackend::File => {
            info!("Using file storage at {}", config.path.display());
            Arc::new(FileStore::new(&config.path).with_quota(quota))
        }
    }
}
