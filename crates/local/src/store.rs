//! Key-value persistence for the local adapter.
//!
//! The adapter only needs `load`/`store` on string values; anything
//! from a browser-style storage shim to a directory of files fits.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// The backing store could not be reached or written.
#[derive(Debug, Error)]
#[error("storage unavailable: {message}")]
pub struct StoreUnavailable {
    pub message: String,
}

impl StoreUnavailable {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<io::Error> for StoreUnavailable {
    fn from(err: io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// String key-value storage.
///
/// A missing key is `Ok(None)`; `Err` means the store itself is
/// unusable.
pub trait KeyValueStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StoreUnavailable>;

    fn store(&self, key: &str, value: &str) -> Result<(), StoreUnavailable>;
}

/// One file per key inside a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys may contain characters like ':' that filesystems reject.
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreUnavailable> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StoreUnavailable> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreUnavailable> {
        Ok(self.lock().get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StoreUnavailable> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.load("k").unwrap(), None);
        store.store("k", "value").unwrap();
        assert_eq!(store.load("k").unwrap(), Some("value".to_string()));
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.load("preview-comments:local-threads").unwrap(), None);
        store
            .store("preview-comments:local-threads", "{\"threads\":[]}")
            .unwrap();
        assert_eq!(
            store.load("preview-comments:local-threads").unwrap(),
            Some("{\"threads\":[]}".to_string())
        );
    }

    #[test]
    fn file_store_sanitizes_keys_into_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.store("a:b/c", "x").unwrap();
        assert!(dir.path().join("a-b-c.json").exists());
    }

    #[test]
    fn file_store_overwrites_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.store("k", "one").unwrap();
        store.store("k", "two").unwrap();
        assert_eq!(store.load("k").unwrap(), Some("two".to_string()));
    }
}
