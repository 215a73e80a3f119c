//! Configuration Manager

use super::{Config, StorageBackend};
use crate::Result;
use anyhow::{Context, bail};
use std::path::{Path, PathBuf};

/// Manages configuration loading and validation
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            
            config.validate()
                .with_context(|| "Configuration validation failed")?;
            
            tracing::info!("Configuration loaded and validated successfully");
            Ok(config)
        } else {
            tracing::warn!("Configuration file not found at {}, using defaults", path.display());
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Config> {
        let mut config = Config::default();
        Self::apply_env(&mut config, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `INFOSHELL_*` overrides read through `lookup`
    fn apply_env<F>(config: &mut Config, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("INFOSHELL_STORAGE_BACKEND") {
            config.storage.backend = backend.parse::<StorageBackend>()
                .with_context(|| format!("Invalid INFOSHELL_STORAGE_BACKEND: {}", backend))?;
        }
        
        if let Some(path) = lookup("INFOSHELL_STORAGE_PATH") {
            config.storage.path = PathBuf::from(path);
        }
        
        if let Some(quota) = lookup("INFOSHELL_STORAGE_QUOTA_BYTES") {
            config.storage.quota_bytes = Some(quota.parse::<usize>()
                .with_context(|| format!("Invalid INFOSHELL_STORAGE_QUOTA_BYTES: {}", quota))?);
        }
        
        if let Some(dir) = lookup("INFOSHELL_EXPORT_DIR") {
            config.export.directory = PathBuf::from(dir);
        }
        
        if let Some(min_len) = lookup("INFOSHELL_MIN_PASSWORD_LENGTH") {
            config.forms.min_password_length = min_len.parse::<usize>()
                .with_context(|| format!("Invalid INFOSHELL_MIN_PASSWORD_LENGTH: {}", min_len))?;
        }
        
        if let Some(log_level) = lookup("INFOSHELL_LOG_LEVEL") {
            config.logging.log_level = log_level;
        }
        
        Ok(())
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_storage_config()
            .with_context(|| "Storage configuration validation failed")?;
        
        self.validate_auth_config()
            .with_context(|| "Authentication configuration validation failed")?;
        
        self.validate_forms_config()
            .with_context(|| "Forms configuration validation failed")?;
        
        self.validate_export_config()
            .with_context(|| "Export configuration validation failed")?;
        
        self.validate_logging_config()
            .with_context(|| "Logging configuration validation failed")?;
        
        Ok(())
    }
    
    fn validate_storage_config(&self) -> Result<()> {
        if self.storage.backend == StorageBackend::File && self.storage.path.as_os_str().is_empty() {
            bail!("storage.path must be set when the file backend is selected");
        }
        
        Ok(())
    }
    
    fn validate_auth_config(&self) -> Result<()> {
        if self.auth.users_key.is_empty() {
            bail!("auth.users_key must not be empty");
        }
        
        if self.auth.current_user_key.is_empty() {
            bail!("auth.current_user_key must not be empty");
        }
        
        if self.auth.users_key == self.auth.current_user_key {
            bail!("auth.users_key and auth.current_user_key must differ");
        }
        
        Ok(())
    }
    
    fn validate_forms_config(&self) -> Result<()> {
        if self.forms.min_password_length == 0 {
            bail!("forms.min_password_length must be at least 1");
        }
        
        if self.forms.min_password_length > 128 {
            bail!("forms.min_password_length cannot exceed 128");
        }
        
        Ok(())
    }
    
    fn validate_export_config(&self) -> Result<()> {
        if self.export.directory.as_os_str().is_empty() {
            bail!("export.directory must not be empty");
        }
        
        Ok(())
    }
    
    fn validate_logging_config(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.log_level.as_str()) {
            bail!("logging.log_level must be one of: {}", valid_log_levels.join(", "));
        }
        
        Ok(())
    }

    /// Merge with CLI arguments
    pub fn merge_with_cli_args(
        &mut self,
        backend: Option<StorageBackend>,
        storage_path: Option<&Path>,
        export_dir: Option<&Path>,
    ) {
        if let Some(backend) = backend {
            self.storage.backend = backend;
            tracing::info!("CLI override: storage backend set to {:?}", backend);
        }

        if let Some(path) = storage_path {
            self.storage.path = path.to_path_buf();
            tracing::info!("CLI override: storage path set to {}", path.display());
        }

        if let Some(dir) = export_dir {
            self.export.directory = dir.to_path_buf();
            tracing::info!("CLI override: export directory set to {}", dir.display());
        }
    }
}
