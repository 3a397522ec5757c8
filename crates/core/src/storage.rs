//! Key-value storage backends for persisted client state

use crate::{CoreError, CoreResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

/// String key-value storage, the persistence seam for the session
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> CoreResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> CoreResult<()>;
    async fn remove(&self, key: &str) -> CoreResult<()>;
}

/// In-memory store; contents are lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Snapshot of the current keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// File-backed store holding a single JSON object of string values.
///
/// A missing file reads as empty. Writes rewrite the whole file and restrict
/// it to the owner on Unix.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> CoreResult<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                CoreError::serialization(format!(
                    "Failed to parse store {}: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, data).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }
}

// Mock implementation for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub KeyValueStore {}

        #[async_trait]
        impl KeyValueStore for KeyValueStore {
            async fn get(&self, key: &str) -> CoreResult<Option<String>>;
            async fn set(&self, key: &str, value: &str) -> CoreResult<()>;
            async fn remove(&self, key: &str) -> CoreResult<()>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.set("access_token", "A1").await.unwrap();
        assert_eq!(
            store.get("access_token").await.unwrap().as_deref(),
            Some("A1")
        );

        store.remove("access_token").await.unwrap();
        assert_eq!(store.get("access_token").await.unwrap(), None);
        // removing an absent key is fine
        store.remove("access_token").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("session.json"));
        assert_eq!(store.get("access_token").await.unwrap(), None);
        store.remove("access_token").await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");

        let store = FileStore::new(&path);
        store.set("access_token", "A1").await.unwrap();
        store.set("refresh_token", "R1").await.unwrap();
        drop(store);

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("access_token").await.unwrap().as_deref(),
            Some("A1")
        );
        assert_eq!(
            reopened.get("refresh_token").await.unwrap().as_deref(),
            Some("R1")
        );

        reopened.remove("access_token").await.unwrap();
        assert_eq!(reopened.get("access_token").await.unwrap(), None);
        assert_eq!(
            reopened.get("refresh_token").await.unwrap().as_deref(),
            Some("R1")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        store.set("refresh_token", "R1").await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        let err = store.get("access_token").await.unwrap_err();
        assert!(matches!(err, CoreError::Serialization { .. }));
    }
}
