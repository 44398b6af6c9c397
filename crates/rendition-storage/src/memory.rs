//! In-memory storage backend.
//!
//! Keeps objects in a map and counts calls. Used for dry runs
//! (`STORAGE_BACKEND=memory`) and as the test double of the pipeline.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::traits::{ObjectStorage, StorageError, StorageResult};
use crate::StorageBackend;

pub struct MemoryStorage {
    base_url: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    public: Mutex<HashSet<String>>,
    uploads: AtomicUsize,
    exists_calls: AtomicUsize,
    fail_uploads: AtomicBool,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
            public: Mutex::new(HashSet::new()),
            uploads: AtomicUsize::new(0),
            exists_calls: AtomicUsize::new(0),
            fail_uploads: AtomicBool::new(false),
        }
    }

    /// Seed an object as if a previous run had uploaded it.
    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.lock_objects().insert(key.to_string(), data);
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock_objects().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock_objects().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn is_public(&self, key: &str) -> bool {
        self.public
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(key)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    /// Make every following upload fail with `NetworkFailure`.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    fn lock_objects(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lock_objects().contains_key(key))
    }

    async fn upload_file(
        &self,
        local_path: &Path,
        key: &str,
        _content_type: &str,
    ) -> StorageResult<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::NetworkFailure(format!(
                "simulated upload failure for {}",
                key
            )));
        }

        let data = tokio::fs::read(local_path).await?;
        self.lock_objects().insert(key.to_string(), data);
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_public(&self, key: &str) -> StorageResult<()> {
        if !self.lock_objects().contains_key(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        self.public
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn upload_then_exists() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.jpg");
        tokio::fs::write(&file, b"abc").await.unwrap();

        let storage = MemoryStorage::new("https://cdn.example/");
        assert!(!storage.exists("a.jpg").await.unwrap());
        storage.upload_file(&file, "a.jpg", "image/jpeg").await.unwrap();
        assert!(storage.exists("a.jpg").await.unwrap());
        assert_eq!(storage.get("a.jpg").unwrap(), b"abc");
        assert_eq!(storage.public_url("a.jpg"), "https://cdn.example/a.jpg");
    }

    #[tokio::test]
    async fn set_public_requires_object() {
        let storage = MemoryStorage::new("https://cdn.example");
        assert!(matches!(
            storage.set_public("missing.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
