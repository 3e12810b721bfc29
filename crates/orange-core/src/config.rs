//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API URL, where credentials are kept, the rejection policy and the last
//! used username.
//!
//! Configuration is stored at `~/.config/orange-app/config.json`. The
//! `API_URL` environment variable overrides the stored API URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::RejectionPolicy;
use crate::auth::{CredentialStore, FileStore, KeyringStore, MemoryStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "orange-app";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `api_url`
pub const API_URL_ENV: &str = "API_URL";

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where the session tokens are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// OS keychain
    #[default]
    Keyring,
    /// JSON file in the data directory
    File,
    /// Process memory only
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API URL as stored in the config file
    pub api_url: String,
    pub credential_backend: CredentialBackend,
    pub demote_on_auth_rejected: bool,
    pub request_timeout_secs: u64,
    pub last_username: Option<String>,
    /// `API_URL` from the environment; never written back to the file
    #[serde(skip)]
    api_url_override: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credential_backend: CredentialBackend::default(),
            demote_on_auth_rejected: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_username: None,
            api_url_override: None,
        }
    }
}

impl Config {
    /// Load the config file (or defaults) and apply environment overrides
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
    }

    /// Load from `path`; a missing file gives the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Use `url` instead of the stored API URL for this process. Blank values are ignored.
    pub fn with_api_url_override(mut self, url: Option<String>) -> Self {
        self.api_url_override = url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        self
    }

    /// The API URL to talk to: the environment override if set, else the stored one
    pub fn api_url(&self) -> &str {
        self.api_url_override.as_deref().unwrap_or(&self.api_url)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Record the last username in the config file, leaving every other stored
    /// value as it is on disk. A file that cannot be parsed is not touched.
    pub fn remember_username(&mut self, username: &str) -> Result<()> {
        self.last_username = Some(username.to_string());
        Self::remember_username_at(&Self::config_path()?, username)
    }

    fn remember_username_at(path: &Path, username: &str) -> Result<()> {
        let mut stored = Self::load_from(path)?;
        stored.last_username = Some(username.to_string());
        stored.save_to(path)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the credential file for the `file` backend
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Build the credential store selected by `credential_backend`
    pub fn credential_store(&self) -> Result<Arc<dyn CredentialStore>> {
        let store: Arc<dyn CredentialStore> = match self.credential_backend {
            CredentialBackend::Keyring => Arc::new(KeyringStore::new()),
            CredentialBackend::File => Arc::new(FileStore::new(self.data_dir()?)),
            CredentialBackend::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }

    pub fn rejection_policy(&self) -> RejectionPolicy {
        RejectionPolicy {
            demote_on_auth_rejected: self.demote_on_auth_rejected,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Absolute URL for a server-relative media path such as a member photo
    pub fn media_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"api_url": "https://library.example.org"}"#)
            .expect("Failed to parse config JSON");
        assert_eq!(config.api_url, "https://library.example.org");
        assert_eq!(config.credential_backend, CredentialBackend::Keyring);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.rejection_policy().demote_on_auth_rejected);
    }

    #[test]
    fn test_backend_names() {
        let config: Config = serde_json::from_str(r#"{"credential_backend": "file"}"#)
            .expect("Failed to parse config JSON");
        assert_eq!(config.credential_backend, CredentialBackend::File);
    }

    #[test]
    fn test_env_override_is_not_saved() {
        //* Given
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"api_url": "https://prod.example"}"#).unwrap();

        let mut config = Config::load_from(&path)
            .unwrap()
            .with_api_url_override(Some("http://staging.example".to_string()));
        assert_eq!(config.api_url(), "http://staging.example");

        //* When
        config.last_username = Some("admin".to_string());
        config.save_to(&path).unwrap();

        //* Then
        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.api_url, "https://prod.example");
        assert_eq!(saved.api_url(), "https://prod.example");
        assert_eq!(saved.last_username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let config = Config::default().with_api_url_override(Some("  ".to_string()));
        assert_eq!(config.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_remember_username_keeps_stored_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{"api_url": "https://prod.example", "credential_backend": "file"}"#,
        )
        .unwrap();

        Config::remember_username_at(&path, "admin").unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.api_url, "https://prod.example");
        assert_eq!(saved.credential_backend, CredentialBackend::File);
        assert_eq!(saved.last_username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_remember_username_leaves_unparsable_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(Config::remember_username_at(&path, "admin").is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_media_url_joins_single_slash() {
        let config = Config {
            api_url: "http://10.0.2.2:8000/".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.media_url("/media/students/a.jpg"),
            "http://10.0.2.2:8000/media/students/a.jpg"
        );
        assert_eq!(
            config.media_url("media/students/a.jpg"),
            "http://10.0.2.2:8000/media/students/a.jpg"
        );
    }
}
