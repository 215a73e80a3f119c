//! User data export

use crate::auth::User;
use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

pub const EXPORT_MIME_TYPE: &str = "application/json";
pub const EXPORT_FILE_NAME: &str = "infoshell_users.json";

/// A file ready to hand to the user: name, content type and body.
///
/// The body carries every account including plain-text passwords. Nothing
/// restricts who may produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

impl ExportArtifact {
    /// Render `users` as a two-space indented JSON array named `infoshell_users.json`
    pub fn from_users(users: &[User]) -> Result<Self> {
        let contents = serde_json::to_string_pretty(users).context("Failed to serialize users for export")?;
        Ok(Self {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime_type: EXPORT_MIME_TYPE,
            contents,
        })
    }

    /// Write the artifact into `dir`, returning the full path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents)
            .with_context(|| format!("Failed to write export file: {}", path.display()))?;

        info!("Wrote {} ({} bytes) to {}", self.file_name, self.contents.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn user(email: &str) -> User {
        User {
            id: "42".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            phone: "123".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            last_login: None,
        }
    }

    #[test]
    fn test_contents_are_indented_json() {
        let artifact = ExportArtifact::from_users(&[user("a@b.com")]).unwrap();

        assert_eq!(artifact.file_name, "infoshell_users.json");
        assert_eq!(artifact.mime_type, "application/json");
        assert!(artifact.contents.starts_with("[\n  {\n    \"id\": \"42\""));
        assert!(artifact.contents.contains("\"password\": \"secret1\""));
    }

    #[test]
    fn test_empty_export() {
        let artifact = ExportArtifact::from_users(&[]).unwrap();
        assert_eq!(artifact.contents, "[]");
    }

    #[test]
    fn test_write_to_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("exports");
        let artifact = ExportArtifact::from_users(&[user("a@b.com")]).unwrap();

        let path = artifact.write_to(&target).unwrap();
        assert_eq!(path, target.join("infoshell_users.json"));

        let written = std::fs::read_to_string(path).unwrap();
        let parsed: Vec<User> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, vec![user("a@b.com")]);
    }
}
