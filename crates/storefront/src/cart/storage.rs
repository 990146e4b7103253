//! Durable key-value storage for the persisted cart.
//!
//! Storage is string-in, string-out under a fixed key, the same contract as
//! browser local storage. Callers decide what to do with failures; the cart
//! store logs them and carries on.

use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The key cannot be used as a storage name.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    /// The cart could not be encoded for storage.
    #[error("failed to encode cart: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The write would exceed the backend's capacity.
    #[error("storage quota exceeded ({needed} bytes needed, {capacity} available)")]
    QuotaExceeded { needed: usize, capacity: usize },
}

/// A synchronous key-value store for serialized cart state.
pub trait CartStorage {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be stored.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for &mut T {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

impl<T: CartStorage + ?Sized> CartStorage for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

/// In-memory storage, optionally capped at a byte budget like a browser's
/// local storage quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    capacity: Option<usize>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes once keys plus values exceed `bytes`.
    #[must_use]
    pub fn with_capacity_bytes(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: Some(bytes),
        }
    }

    /// Raw stored value, bypassing the trait.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Store a raw value directly, ignoring the capacity.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(capacity) = self.capacity {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > capacity {
                return Err(StorageError::QuotaExceeded { needed, capacity });
            }
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary file that is renamed over the target, so a crash
/// mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] unless the key is non-empty, does
    /// not start with a dot, and contains only ASCII letters, digits, `_`,
    /// `-` and `.`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CartStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.read("cart").unwrap().is_none());
        storage.write("cart", "[]").unwrap();
        assert_eq!(storage.read("cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_quota() {
        let mut storage = MemoryStorage::with_capacity_bytes(10);
        storage.write("k", "123456789").unwrap();
        // Overwriting the same key is measured without the old value.
        storage.write("k", "987654321").unwrap();
        let err = storage.write("k", "0123456789").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                needed: 11,
                capacity: 10
            }
        ));
        assert_eq!(storage.get("k"), Some("987654321"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        assert!(storage.read("emirates_cart").unwrap().is_none());
        storage.write("emirates_cart", "[1]").unwrap();
        storage.write("emirates_cart", "[2]").unwrap();
        assert_eq!(storage.read("emirates_cart").unwrap().as_deref(), Some("[2]"));
        assert!(dir.path().join("nested/emirates_cart.json").exists());
        assert!(!dir.path().join("nested/.emirates_cart.json.tmp").exists());
    }

    #[test]
    fn test_file_rejects_bad_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        for key in ["", "../escape", ".hidden", "a/b", "with space"] {
            assert!(
                matches!(storage.write(key, "x"), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut storage = MemoryStorage::new();
        {
            let mut borrowed = &mut storage;
            CartStorage::write(&mut borrowed, "cart", "x").unwrap();
        }
        assert_eq!(storage.get("cart"), Some("x"));
    }
}
