//! Durable key-value storage for the cart blob.
//!
//! The cart persists as one serialized blob under a fixed key. The production
//! [`JsonFileStore`] backs that slot with a JSON file holding a
//! string-to-string map: the whole map is loaded at open and the whole file
//! is rewritten on every write.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{fs, sync::RwLock};
use tracing::warn;

/// Errors from the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the backing map failed.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable slot store: read and write one serialized blob by key.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Read the blob stored under `key`, if any.
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `blob` under `key`, replacing any previous value.
    async fn write(&self, key: &str, blob: &str) -> Result<(), StorageError>;
}

/// JSON file-backed key-value store.
///
/// Persists a `HashMap<String, String>` to a single JSON file. Intended for
/// lightweight per-session state where a database is overkill.
pub struct JsonFileStore {
    entries: RwLock<HashMap<String, String>>,
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Open the store from a path. Creates the file with an empty map if
    /// missing. An unparsable file degrades to an empty map with a logged
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if a missing file cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let entries: HashMap<String, String> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(
                    path = %file_path.display(),
                    error = %e,
                    "Storage file is unreadable, starting with an empty map"
                );
                HashMap::new()
            }),
            Err(_) => {
                let empty = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty)?).await?;
                empty
            }
        };

        Ok(Self {
            entries: RwLock::new(entries),
            file_path,
        })
    }

    async fn save(&self) -> Result<(), StorageError> {
        let entries = self.entries.read().await;
        let data = serde_json::to_vec(&*entries)?;
        drop(entries);
        fs::write(&self.file_path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl CartStorage for JsonFileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn write(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), blob.to_string());
        drop(entries);
        self.save().await
    }
}

/// In-memory store for tests and doc examples.
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::{CartStorage, StorageError};

    /// In-memory key-value store with write counting and failure injection.
    #[derive(Default)]
    pub struct MemoryStore {
        entries: Mutex<HashMap<String, String>>,
        fail_writes: AtomicBool,
        writes: AtomicUsize,
    }

    impl MemoryStore {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-seed a key, e.g. with a blob persisted by an earlier session.
        pub fn seed(&self, key: &str, blob: &str) {
            self.entries
                .lock()
                .expect("store lock poisoned")
                .insert(key.to_string(), blob.to_string());
        }

        /// Make subsequent writes fail with an I/O error.
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Raw value currently stored under `key`.
        #[must_use]
        pub fn get(&self, key: &str) -> Option<String> {
            self.entries
                .lock()
                .expect("store lock poisoned")
                .get(key)
                .cloned()
        }

        /// Number of `write` calls attempted so far, including failed ones.
        #[must_use]
        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CartStorage for MemoryStore {
        async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.get(key))
        }

        async fn write(&self, key: &str, blob: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Io(std::io::Error::other(
                    "write failure injected",
                )));
            }
            self.seed(key, blob);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("cart_storage_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_file_store_round_trips_across_reopen() -> Result<(), StorageError> {
        let path = temp_path();
        let store = JsonFileStore::open(&path).await?;

        assert_eq!(store.read("cart").await?, None);

        store.write("cart", "[1,2,3]").await?;
        store.write("other", "x").await?;
        assert_eq!(store.read("cart").await?, Some("[1,2,3]".to_string()));

        // overwrite replaces the previous value
        store.write("cart", "[4]").await?;

        let reopened = JsonFileStore::open(&path).await?;
        assert_eq!(reopened.read("cart").await?, Some("[4]".to_string()));
        assert_eq!(reopened.read("other").await?, Some("x".to_string()));

        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn json_file_store_tolerates_corrupt_file() -> Result<(), StorageError> {
        let path = temp_path();
        fs::write(&path, b"not json at all").await?;

        let store = JsonFileStore::open(&path).await?;
        assert_eq!(store.read("cart").await?, None);

        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_counts_and_fails_writes() {
        let store = MemoryStore::new();
        store.write("k", "v").await.expect("write succeeds");
        assert_eq!(store.get("k"), Some("v".to_string()));

        store.fail_writes(true);
        let err = store.write("k", "v2").await;
        assert!(err.is_err());
        assert_eq!(store.get("k"), Some("v".to_string()));
        assert_eq!(store.writes(), 2);
    }
}
