#[cfg(feature = "storage-gcs")]
use crate::GcsStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::MemoryStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{ObjectStorage, StorageBackend, StorageError, StorageResult};
use rendition_core::StorageConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration
///
/// Credentials are resolved here, once per process.
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStorage>> {
    match config.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .region
                .clone()
                .unwrap_or_else(|| "us-east-1".to_string());

            let storage = S3Storage::new(bucket, region, config.endpoint.clone(), config.public_read)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-gcs")]
        StorageBackend::Gcs => {
            let bucket = config
                .bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("GCS_BUCKET not configured".to_string()))?;

            let storage = GcsStorage::new(
                bucket,
                config.credentials_path.as_deref(),
                config.public_read,
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-gcs"))]
        StorageBackend::Gcs => Err(StorageError::ConfigError(
            "GCS storage backend not available (storage-gcs feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; published artifacts are discarded on exit");
            let base_url = config
                .public_base_url
                .clone()
                .unwrap_or_else(|| "memory://artifacts".to_string());
            Ok(Arc::new(MemoryStorage::new(base_url)))
        }
    }
}
