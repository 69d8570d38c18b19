//! Storage Backend Module
//!
//! The flat string table the cache is layered over, injected at construction.
//! Backends impose no TTL or size policy of their own.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StorageError;

// == Key Value Store ==
/// String-keyed, string-valued persistent table.
pub trait KeyValueStore: Send + Sync {
    /// Cheap usability check; fails when the backend cannot be used at all.
    fn probe(&self) -> Result<(), StorageError>;

    fn get(&self, key: &str) -> Option<String>;

    /// Writes a record, replacing any existing one.
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Removes a key. Returns whether it was present.
    fn remove(&mut self, key: &str) -> Result<bool, StorageError>;

    fn keys(&self) -> Vec<String>;
}

// == Memory Store ==
/// In-memory table with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    /// Max total of key + value bytes, None = unlimited
    quota_bytes: Option<usize>,
    disabled: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys plus values exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// A store whose probe always fails, as when storage is disabled.
    pub fn unavailable() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Total bytes of keys and values currently held.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn probe(&self) -> Result<(), StorageError> {
        if self.disabled {
            Err(StorageError::Unavailable("storage is disabled".to_string()))
        } else {
            Ok(())
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        if let Some(limit) = self.quota_bytes {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

// == File Store ==
/// Table persisted as a single JSON object on disk.
///
/// Every mutation rewrites the whole file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Opens the table at `path`.
    ///
    /// A missing file starts empty. An unreadable or corrupt file also starts
    /// empty and is overwritten on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                warn!("Discarding corrupt store file {}: {}", path.display(), err);
                HashMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        debug!("Opened file store {} with {} keys", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), StorageError> {
        let text = serde_json::to_string(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn probe(&self) -> Result<(), StorageError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        let meta = fs::metadata(&dir)?;
        if meta.permissions().readonly() {
            return Err(StorageError::Unavailable(format!(
                "{} is read-only",
                dir.display()
            )));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(err) = self.flush() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        let Some(old) = self.entries.remove(key) else {
            return Ok(false);
        };
        if let Err(err) = self.flush() {
            self.entries.insert(key.to_string(), old);
            return Err(err);
        }
        Ok(true)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        store.set("a", "1".to_string()).unwrap();
        assert_eq!(store.get("a"), Some("1".to_string()));
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_quota() {
        let mut store = MemoryStore::with_quota(10);
        store.set("k", "12345".to_string()).unwrap();
        let result = store.set("j", "123456".to_string());
        assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));

        // Replacing an existing key only counts the difference
        store.set("k", "123456789".to_string()).unwrap();
        assert_eq!(store.used_bytes(), 10);
    }

    #[test]
    fn test_memory_store_unavailable() {
        let store = MemoryStore::unavailable();
        assert!(matches!(store.probe(), Err(StorageError::Unavailable(_))));
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        {
            let mut store = FileStore::open(&path).unwrap();
            store.probe().unwrap();
            store.set("page_x", "1:int:1".to_string()).unwrap();
            store.set("page_y", "2:int:2".to_string()).unwrap();
            store.remove("page_y").unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("page_x"), Some("1:int:1".to_string()));
        assert_eq!(store.get("page_y"), None);
        assert_eq!(store.keys().len(), 1);
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.keys().is_empty());

        store.set("k", "v".to_string()).unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_file_store_failed_flush_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = dir.path().join("store");
        let mut store = FileStore::open(store_dir.join("cache.json")).unwrap();
        store.set("page_x", "1:int:1".to_string()).unwrap();

        fs::remove_dir_all(&store_dir).unwrap();

        assert!(store.remove("page_x").is_err());
        assert_eq!(store.get("page_x"), Some("1:int:1".to_string()));

        assert!(store.set("page_x", "2:int:2".to_string()).is_err());
        assert!(store.set("page_y", "3:int:3".to_string()).is_err());
        assert_eq!(store.get("page_x"), Some("1:int:1".to_string()));
        assert_eq!(store.get("page_y"), None);
    }
}
