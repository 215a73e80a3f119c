//! File-backed key-value backend

use super::types::{check_quota, projected_usage, KeyValueStore, StorageError, StorageResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

/// Persistent store kept as a single JSON object file.
///
/// The file is re-read on every call and rewritten whole on every mutation
/// (uniquely named temp file + rename), so a second process sees committed writes but two
/// processes mutating concurrently can still lose an update.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    quota_bytes: Option<usize>,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Reject writes that would grow the store past `quota_bytes`
    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let content = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        // uniquely named sibling, deleted on drop if never persisted
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(content.as_bytes()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        debug!("Persisted {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }

    fn mutate<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> StorageResult<bool>,
    {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load()?;
        if f(&mut entries)? {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let quota = self.quota_bytes;
        self.mutate(|entries| {
            check_quota(quota, projected_usage(entries.iter(), key, value))?;
            entries.insert(key.to_string(), value.to_string());
            Ok(true)
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.mutate(|entries| Ok(entries.remove(key).is_some()))
    }

    fn clear(&self) -> StorageResult<()> {
        self.mutate(|entries| {
            let changed = !entries.is_empty();
            entries.clear();
            Ok(changed)
        })
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("origin.json"));

        assert_eq!(store.get("anything").unwrap(), None);
        assert!(store.keys().unwrap().is_empty());
        // remove on a missing file must not create it
        store.remove("anything").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("origin.json");

        let store = FileStore::new(&path);
        store.set("infoshell_users", "[]").unwrap();
        store.set("other", "x").unwrap();
        drop(store);

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("infoshell_users").unwrap(), Some("[]".to_string()));
        assert_eq!(reopened.keys().unwrap(), vec!["infoshell_users".to_string(), "other".to_string()]);
    }

    #[test]
    fn test_corrupt_file_reports_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("origin.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get("k"), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_writes_leave_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("origin.json");
        let first = FileStore::new(&path);
        let second = FileStore::new(&path);

        first.set("a", "1").unwrap();
        second.set("b", "2").unwrap();
        first.remove("a").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["origin.json".to_string()]);
        assert_eq!(second.keys().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn test_failed_replace_cleans_up_temp_file() {
        let dir = TempDir::new().unwrap();
        // a directory where the store file should be makes the final rename fail
        let path = dir.path().join("origin.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let store = FileStore::new(&path);
        assert!(store.persist(&BTreeMap::from([("k".to_string(), "v".to_string())])).is_err());

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["origin.json".to_string()]);
    }

    #[test]
    fn test_quota_applies_to_file_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("origin.json")).with_quota(Some(6));

        store.set("k", "12345").unwrap();
        assert!(matches!(store.set("k", "123456"), Err(StorageError::QuotaExceeded { .. })));
        assert_eq!(store.get("k").unwrap(), Some("12345".to_string()));
    }
}
