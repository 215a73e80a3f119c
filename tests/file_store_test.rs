//! Tests for persistence through the file-backed store

use infoshell::auth::{AuthManager, RegistrationRequest};
use infoshell::config::{AuthConfig, StorageBackend, StorageConfig};
use infoshell::storage::{self, FileStore, KeyValueStore};
use std::sync::Arc;
use tempfile::TempDir;

fn signup(email: &str) -> RegistrationRequest {
    RegistrationRequest {
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        email: email.to_string(),
        password: "secret1".to_string(),
        phone: "123".to_string(),
    }
}

fn file_config(dir: &TempDir) -> StorageConfig {
    StorageConfig {
        backend: StorageBackend::File,
        path: dir.path().join("origin.json"),
        quota_bytes: None,
    }
}

#[test]
fn test_accounts_and_session_survive_reload() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);

    {
        let auth = AuthManager::new(storage::open_store(&config), &AuthConfig::default());
        assert!(auth.register(signup("a@b.com")).success);
        assert!(auth.login("a@b.com", "secret1").success);
    }

    let auth = AuthManager::new(storage::open_store(&config), &AuthConfig::default());
    assert_eq!(auth.list_users().len(), 1);
    assert_eq!(auth.current_user().unwrap().email, "a@b.com");

    auth.logout();
    let auth = AuthManager::new(storage::open_store(&config), &AuthConfig::default());
    assert!(!auth.is_authenticated());
}

#[test]
fn test_store_file_uses_browser_layout() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);
    let auth = AuthManager::new(storage::open_store(&config), &AuthConfig::default());
    auth.register(signup("a@b.com"));

    let raw = std::fs::read_to_string(&config.path).unwrap();
    let outer: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let users_blob = outer["infoshell_users"].as_str().unwrap();
    let users: serde_json::Value = serde_json::from_str(users_blob).unwrap();

    assert_eq!(users[0]["email"], "a@b.com");
    assert_eq!(users[0]["firstName"], "A");
    assert!(users[0]["lastLogin"].is_null());
    assert!(users[0]["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_unreadable_store_file_degrades_to_empty() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);
    std::fs::write(&config.path, "{{{{").unwrap();

    let auth = AuthManager::new(storage::open_store(&config), &AuthConfig::default());
    assert!(auth.list_users().is_empty());
    assert!(auth.current_user().is_none());

    // writes fail too since the file cannot be merged into
    let result = auth.register(signup("a@b.com"));
    assert!(!result.success);
    assert_eq!(result.message, "Error creating account. Please try again.");
}

#[test]
fn test_stale_full_list_write_loses_concurrent_registration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("origin.json");
    let tab_one = AuthManager::new(Arc::new(FileStore::new(&path)), &AuthConfig::default());
    let tab_two = AuthManager::new(Arc::new(FileStore::new(&path)), &AuthConfig::default());

    // tab one reads, tab two registers, tab one writes back what it read
    let stale = tab_one.list_users();
    assert!(tab_two.register(signup("two@b.com")).success);
    assert!(tab_one.save_users(&stale));

    assert!(tab_two.list_users().is_empty());
}

#[test]
fn test_clear_removes_file_contents() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);
    let store = storage::open_store(&config);
    let auth = AuthManager::new(store.clone(), &AuthConfig::default());
    auth.register(signup("a@b.com"));
    auth.login("a@b.com", "secret1");

    assert!(auth.clear_all());
    assert_eq!(store.keys().unwrap(), vec!["infoshell_users".to_string()]);
    assert_eq!(store.get("infoshell_users").unwrap().as_deref(), Some("[]"));
}
