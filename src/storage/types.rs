//! Storage Types

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a key-value backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// String-keyed, string-valued persistent storage scoped to one origin.
///
/// Every call runs to completion before returning. Backends make no promise
/// about isolation between separate handles on the same underlying data: two
/// writers doing read-modify-write on the same key race, and the last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Delete every key
    fn clear(&self) -> StorageResult<()>;

    /// All keys currently present, sorted
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Short backend name used in log lines
    fn backend_name(&self) -> &'static str;
}

/// Shared handle to the configured store
pub type StoreHandle = Arc<dyn KeyValueStore>;

/// Bytes the store would hold after writing `value` under `key`.
///
/// Usage is counted as the sum of key and value lengths, the same way a
/// browser accounts for its per-origin quota.
pub(crate) fn projected_usage<'a, I>(entries: I, key: &str, value: &str) -> usize
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let others: usize = entries
        .into_iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
    others + key.len() + value.len()
}

/// Fail with `QuotaExceeded` when a write would grow past `quota`
pub(crate) fn check_quota(quota: Option<usize>, needed: usize) -> StorageResult<()> {
    match quota {
        Some(quota) if needed > quota => Err(StorageError::QuotaExceeded { needed, quota }),
        _ => Ok(()),
    }
}

/// Snapshot of a store's contents, used by debug dumps
pub fn snapshot(store: &dyn KeyValueStore) -> StorageResult<HashMap<String, String>> {
    let mut out = HashMap::new();
    for key in store.keys()? {
        if let Some(value) = store.get(&key)? {
            out.insert(key, value);
        }
    }
    Ok(out)
}
