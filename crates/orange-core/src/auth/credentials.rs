//! Persisted storage for the session tokens.
//!
//! Every backend implements the same three operations: `get`, `set` and
//! `remove`. Removing a key that was never set is not an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Key under which the access token is stored
pub const ACCESS_TOKEN_KEY: &str = "jwtToken";

/// Key under which the refresh token is stored
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Default keychain service name
const SERVICE_NAME: &str = "orange-app";

/// Credential file name inside the data directory
const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Failed to access credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage of named secret strings.
pub trait CredentialStore: Send + Sync {
    /// Return the stored value, or `None` if it was never set or has been removed.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Create or overwrite an entry.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete an entry if present.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// ============================================================================
// OS keychain
// ============================================================================

/// Tokens stored in the OS keychain, one entry per key.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a custom service name, e.g. to keep several profiles apart.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the entry, then read it back through a fresh handle.
    ///
    /// Keychains that accept writes without keeping them (keyring's mock
    /// store on unsupported platforms) are reported as `Unavailable`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?.set_password(value)?;

        match self.entry(key)?.get_password() {
            Ok(stored) if stored == value => Ok(()),
            Ok(_) | Err(keyring::Error::NoEntry) => Err(StorageError::Unavailable(format!(
                "keychain service '{}' did not keep {}",
                self.service, key
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// JSON file
// ============================================================================

/// Tokens stored as a JSON object in a file.
///
/// The file is re-read on every `get` so that separate instances pointing at
/// the same directory (or a restarted process) always agree. Writes go to a
/// temporary file which is then renamed over the original.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store keeping its file inside `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CREDENTIALS_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(io_err)?;
        restrict_permissions(&tmp).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, StorageError> {
        self.lock
            .lock()
            .map_err(|_| StorageError::Unavailable("credential file lock poisoned".to_string()))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.guard()?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.guard()?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)?;
        debug!(key, path = %self.path.display(), "Credential written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.guard()?;
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
            debug!(key, path = %self.path.display(), "Credential removed");
        }
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Tokens kept in process memory only. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);

        store.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        // Overwrite
        store.set(ACCESS_TOKEN_KEY, "def").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("def"));

        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_memory_store_remove_absent_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove(REFRESH_TOKEN_KEY).is_ok());
        assert!(store.remove(REFRESH_TOKEN_KEY).is_ok());
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();

        let first = FileStore::new(dir.path());
        first.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        first.set(REFRESH_TOKEN_KEY, "xyz").unwrap();

        let second = FileStore::new(dir.path());
        assert_eq!(second.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(second.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("xyz"));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert!(store.remove(ACCESS_TOKEN_KEY).is_ok());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        store.set(REFRESH_TOKEN_KEY, "xyz").unwrap();

        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("xyz"));
    }

    #[test]
    fn test_keyring_store_write_is_readable_or_fails() {
        // Machines without a keychain service fail the write; they must never
        // report success for a value that cannot be read back.
        let service = format!("orange-app-test-{}", std::process::id());
        let store = KeyringStore::with_service(&service);

        match store.set(ACCESS_TOKEN_KEY, "abc") {
            Ok(()) => {
                let fresh = KeyringStore::with_service(&service);
                assert_eq!(fresh.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));
                store.remove(ACCESS_TOKEN_KEY).unwrap();
                assert_eq!(fresh.get(ACCESS_TOKEN_KEY).unwrap(), None);
            }
            Err(e) => eprintln!("no usable keychain here: {e}"),
        }
    }

    #[test]
    fn test_file_store_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(store.path(), "not json").unwrap();

        let err = store.get(ACCESS_TOKEN_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
