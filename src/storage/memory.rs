//! In-memory key-value backend

use super::types::{check_quota, projected_usage, KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// Volatile store backed by a `HashMap`.
///
/// Used by tests and by `--backend memory` runs where nothing should outlive
/// the process. An optional byte quota makes writes fail the way a full
/// browser store does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an empty store with no quota
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects writes past `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of keys present
    pub fn len(&self) -> StorageResult<usize> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        check_quota(self.quota_bytes, projected_usage(entries.iter(), key, value))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.clear();
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));
        assert_eq!(store.len().unwrap(), 1);

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_poisoned_lock_reported_everywhere() {
        let store = Arc::new(MemoryStore::new());
        store.set("k", "v").unwrap();

        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StorageError::Poisoned)));
        assert!(matches!(store.is_empty(), Err(StorageError::Poisoned)));
        assert!(matches!(store.get("k"), Err(StorageError::Poisoned)));
        assert!(matches!(store.set("k", "w"), Err(StorageError::Poisoned)));
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(8);
        store.set("key", "abcde").unwrap();

        let err = store.set("key", "abcdef").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        // previous value survives a rejected write
        assert_eq!(store.get("key").unwrap(), Some("abcde".to_string()));
    }

    #[test]
    fn test_keys_sorted_and_clear() {
        let store = MemoryStore::new();
        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        store.clear().unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
