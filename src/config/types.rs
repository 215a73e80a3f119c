//! Configuration Types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default key holding the serialized user list
pub const DEFAULT_USERS_KEY: &str = "infoshell_users";

/// Default key holding the current session snapshot
pub const DEFAULT_CURRENT_USER_KEY: &str = "infoshell_current_user";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub forms: FormsConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Which key-value backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => anyhow::bail!("unknown storage backend '{}', expected 'memory' or 'file'", other),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// File holding the whole origin's key-value data (file backend only)
    pub path: PathBuf,
    /// Upper bound on stored bytes; 0 or `None` disables the check
    pub quota_bytes: Option<usize>,
}

/// Keys the account store uses inside the key-value backend
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub users_key: String,
    pub current_user_key: String,
}

/// Form validation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FormsConfig {
    pub min_password_length: usize,
}

/// Export configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where the export file is written; the file name itself is fixed
    pub directory: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: PathBuf::from("infoshell_storage.json"),
            // browsers commonly cap an origin at 5 MiB
            quota_bytes: Some(5 * 1024 * 1024),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users_key: DEFAULT_USERS_KEY.to_string(),
            current_user_key: DEFAULT_CURRENT_USER_KEY.to_string(),
        }
    }
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self { min_password_length: 6 }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}
