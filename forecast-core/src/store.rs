//! Tiny key-value persistence for the remembered city.
//!
//! The screen only ever keeps one entry ([`LAST_CITY_KEY`]), but the store is a
//! flat string map so the file format stays a plain JSON object.

use async_trait::async_trait;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;

/// Key under which the last selected city name is kept.
pub const LAST_CITY_KEY: &str = "city";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store file {} is not a JSON string map: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not determine platform data directory")]
    NoDataDir,

    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// JSON file in the platform data directory.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: AsyncMutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: AsyncMutex::new(()),
        }
    }

    /// `store.json` under the platform data dir.
    pub fn open_default() -> Result<Self, StoreError> {
        let dirs = crate::config::project_dirs().map_err(|_| StoreError::NoDataDir)?;
        Ok(Self::new(dirs.data_dir().join("store.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(map).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        tokio::fs::write(&self.path, body).await.map_err(io_err)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        // A corrupt file is overwritten rather than blocking every later write.
        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(StoreError::Corrupt { .. }) => {
                warn!(path = %self.path.display(), "replacing corrupt store file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.insert(key, value);
        store
    }

    pub fn get_now(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn insert(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_now(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));

        assert_eq!(store.get(LAST_CITY_KEY).await.unwrap(), None);
        assert_eq!(store.path(), dir.path().join("store.json"));
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("store.json");

        FileStore::new(&path).set(LAST_CITY_KEY, "Paris").await.unwrap();
        FileStore::new(&path).set(LAST_CITY_KEY, "Tokyo").await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(LAST_CITY_KEY).await.unwrap().as_deref(), Some("Tokyo"));

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[tokio::test]
    async fn file_store_reports_corrupt_file_and_recovers_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        let err = store.get(LAST_CITY_KEY).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));

        store.set(LAST_CITY_KEY, "Lima").await.unwrap();
        assert_eq!(store.get(LAST_CITY_KEY).await.unwrap().as_deref(), Some("Lima"));
    }

    #[tokio::test]
    async fn memory_store_overwrites() {
        let store = MemoryStore::with_entry(LAST_CITY_KEY, "Rome");
        store.set(LAST_CITY_KEY, "Oslo").await.unwrap();

        assert_eq!(store.get(LAST_CITY_KEY).await.unwrap().as_deref(), Some("Oslo"));
        assert_eq!(store.get("other").await.unwrap(), None);
    }
}
