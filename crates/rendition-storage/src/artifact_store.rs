//! Idempotent publishing of local artifacts.
//!
//! `publish` checks for an existing object first and returns its URL without
//! touching it again. Interrupted runs therefore resume cheaply: everything that
//! reached the store before the interruption short-circuits on the next attempt.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::keys::{content_type_for_key, validate_key};
use crate::traits::{ObjectStorage, StorageResult};

#[derive(Clone)]
pub struct ArtifactStore {
    backend: Arc<dyn ObjectStorage>,
    public_base_url: Option<String>,
    uploads: Arc<AtomicUsize>,
}

impl ArtifactStore {
    pub fn new(backend: Arc<dyn ObjectStorage>) -> Self {
        Self {
            backend,
            public_base_url: None,
            uploads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Serve public URLs from `base_url` (e.g. a CDN) instead of the backend's own scheme.
    pub fn with_public_base_url(mut self, base_url: Option<String>) -> Self {
        self.public_base_url = base_url.map(|url| url.trim_end_matches('/').to_string());
        self
    }

    /// Publish `local_path` under `remote_key` and return its public URL.
    ///
    /// Skips the upload entirely when an object already exists at `remote_key`.
    /// Errors from the backend are returned as-is, without retry.
    pub async fn publish(&self, local_path: &Path, remote_key: &str) -> StorageResult<String> {
        validate_key(remote_key)?;

        if self.backend.exists(remote_key).await? {
            tracing::info!(key = %remote_key, "Artifact already published, skipping upload");
            return Ok(self.public_url(remote_key));
        }

        let start = std::time::Instant::now();
        self.backend
            .upload_file(local_path, remote_key, content_type_for_key(remote_key))
            .await?;
        self.backend.set_public(remote_key).await?;
        self.uploads.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            key = %remote_key,
            backend = %self.backend.backend_type(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Artifact published"
        );

        Ok(self.public_url(remote_key))
    }

    pub fn public_url(&self, remote_key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base, remote_key),
            None => self.backend.public_url(remote_key),
        }
    }

    /// Number of uploads this store (and its clones) actually performed.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;
    use crate::traits::StorageError;
    use tempfile::tempdir;

    #[tokio::test]
    async fn second_publish_of_same_key_does_not_upload() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("thumbnail_0.jpg");
        tokio::fs::write(&file, b"jpeg bytes").await.unwrap();

        let backend = Arc::new(MemoryStorage::new("https://cdn.example"));
        let store = ArtifactStore::new(backend.clone());

        let key = "thumbnails/clip/small/thumbnail_0.jpg";
        let first = store.publish(&file, key).await.unwrap();
        let second = store.publish(&file, key).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.upload_count(), 1);
        assert_eq!(store.upload_count(), 1);
        assert!(backend.is_public(key));
    }

    #[tokio::test]
    async fn existing_object_short_circuits_without_reading_local_file() {
        let backend = Arc::new(MemoryStorage::new("https://cdn.example"));
        backend.insert("videos/clip.mp4", b"already there".to_vec());
        let store = ArtifactStore::new(backend.clone());

        let url = store
            .publish(Path::new("/does/not/exist.mp4"), "videos/clip.mp4")
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example/videos/clip.mp4");
        assert_eq!(backend.upload_count(), 0);
    }

    #[tokio::test]
    async fn public_base_url_overrides_backend_scheme() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        tokio::fs::write(&file, b"mp4").await.unwrap();

        let store = ArtifactStore::new(Arc::new(MemoryStorage::new("https://bucket.example")))
            .with_public_base_url(Some("https://cdn.example/media/".to_string()));

        let url = store.publish(&file, "videos/clip.mp4").await.unwrap();
        assert_eq!(url, "https://cdn.example/media/videos/clip.mp4");
    }

    #[tokio::test]
    async fn backend_failures_propagate() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        tokio::fs::write(&file, b"mp4").await.unwrap();

        let backend = Arc::new(MemoryStorage::new("https://cdn.example"));
        backend.fail_uploads(true);
        let store = ArtifactStore::new(backend.clone());

        let result = store.publish(&file, "videos/clip.mp4").await;
        assert!(matches!(result, Err(StorageError::NetworkFailure(_))));
        assert_eq!(store.upload_count(), 0);
    }

    #[tokio::test]
    async fn rejects_invalid_keys_before_any_backend_call() {
        let backend = Arc::new(MemoryStorage::new("https://cdn.example"));
        let store = ArtifactStore::new(backend.clone());

        let result = store.publish(Path::new("x"), "../escape.mp4").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
        assert_eq!(backend.exists_calls(), 0);
    }
}
