//! Durable key/value storage for persisted aggregates.
//!
//! [`Storage`] is infallible. Implementations log failures and carry on, so
//! a broken medium never fails a cart mutation.
//!
//! - [`NoopStorage`] - no persistent medium; reads return `None`, writes vanish
//! - [`MemoryStorage`] - process-lifetime map
//! - [`FileStorage`] - one JSON file per key inside a directory

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::BasketConfig;
use crate::error::{Result, StorageError};

/// A minimal key/value medium.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, or `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]);

    /// Delete the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// Storage used when no persistent medium exists.
///
/// Mutations still work for the lifetime of the process; nothing is retained.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl Storage for NoopStorage {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}

    fn remove(&self, _key: &str) {}
}

/// In-memory storage shared by every store opened on it.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        let storage = Self::new();
        storage.set(&key.into(), &value.into());
        storage
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &[u8]) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_vec());
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Directory-backed storage: each key lives in `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling file first and are renamed into place,
/// so a crash mid-write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if missing) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// The directory holding the stored files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a key, reporting I/O failures.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` for keys that are not plain file
    /// names, or `StorageError::Io` if the file exists but cannot be read.
    pub fn try_get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    /// Write a key, reporting I/O failures.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` for keys that are not plain file
    /// names, or `StorageError::Io` if the file cannot be written.
    pub fn try_set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::io(&path, e))
    }

    /// Delete a key, reporting I/O failures. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` for keys that are not plain file
    /// names, or `StorageError::Io` if the file cannot be removed.
    pub fn try_remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.try_get(key).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Failed to read persisted state");
            None
        })
    }

    fn set(&self, key: &str, value: &[u8]) {
        if let Err(e) = self.try_set(key, value) {
            tracing::warn!(key, error = %e, "Failed to persist state");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            tracing::warn!(key, error = %e, "Failed to remove persisted state");
        }
    }
}

/// Keys map onto file names: ASCII alphanumerics, `-`, `_` and `.`, not
/// starting with a dot.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}

/// Pick the storage medium for this process.
///
/// Uses [`FileStorage`] when a storage directory is configured and usable,
/// and degrades to [`NoopStorage`] otherwise.
#[must_use]
pub fn detect(config: &BasketConfig) -> Arc<dyn Storage> {
    let Some(dir) = config.storage_dir.as_deref() else {
        tracing::info!("No storage directory configured, shopping state will not persist");
        return Arc::new(NoopStorage);
    };

    match FileStorage::open(dir) {
        Ok(storage) => {
            tracing::info!(dir = %dir.display(), "Using file storage");
            Arc::new(storage)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Storage directory unusable, shopping state will not persist");
            Arc::new(NoopStorage)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_storage_discards_writes() {
        let storage = NoopStorage;
        storage.set("cart-storage", b"{}");
        assert!(storage.get("cart-storage").is_none());
        storage.remove("cart-storage");
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set("k", b"v1");
        storage.set("k", b"v2");
        assert_eq!(storage.get("k").unwrap(), b"v2");
        assert_eq!(storage.len(), 1);

        storage.remove("k");
        assert!(storage.get("k").is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_memory_storage_with_entry() {
        let storage = MemoryStorage::with_entry("favorites-storage", "[]");
        assert_eq!(storage.get("favorites-storage").unwrap(), b"[]");
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("state")).unwrap();

        assert!(storage.try_get("cart-storage").unwrap().is_none());
        storage.set("cart-storage", b"{\"version\":4}");
        assert_eq!(storage.get("cart-storage").unwrap(), b"{\"version\":4}");
        assert!(storage.dir().join("cart-storage.json").exists());

        storage.remove("cart-storage");
        assert!(storage.get("cart-storage").is_none());
        // Removing twice is fine.
        storage.try_remove("cart-storage").unwrap();
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::open(dir.path())
            .unwrap()
            .set("favorites-storage", b"[]");

        let reopened = FileStorage::open(dir.path()).unwrap();
        assert_eq!(reopened.get("favorites-storage").unwrap(), b"[]");
    }

    #[test]
    fn test_file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        for key in ["", "../escape", ".hidden", "a/b", "a b"] {
            assert!(
                matches!(storage.try_set(key, b"x"), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
        // The infallible surface swallows the error.
        storage.set("../escape", b"x");
        assert!(storage.get("../escape").is_none());
    }

    #[test]
    fn test_detect_without_dir_is_noop() {
        let config = BasketConfig::default();
        let storage = detect(&config);
        storage.set("cart-storage", b"x");
        assert!(storage.get("cart-storage").is_none());
    }

    #[test]
    fn test_detect_with_unusable_dir_is_noop() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = BasketConfig {
            storage_dir: Some(file.path().to_path_buf()),
            ..BasketConfig::default()
        };
        assert!(FileStorage::open(file.path()).is_err());

        let storage = detect(&config);
        storage.set("cart-storage", b"x");
        assert!(storage.get("cart-storage").is_none());
    }

    #[test]
    fn test_detect_with_dir_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = BasketConfig {
            storage_dir: Some(dir.path().to_path_buf()),
            ..BasketConfig::default()
        };
        let storage = detect(&config);
        storage.set("cart-storage", b"x");
        assert_eq!(storage.get("cart-storage").unwrap(), b"x");
    }
}
