use crate::cloud::{classify, public_read_client_options, put_options};
use crate::traits::{ObjectStorage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload};

/// Google Cloud Storage implementation (also serves Firebase Storage buckets)
#[derive(Clone)]
pub struct GcsStorage {
    store: GoogleCloudStorage,
    bucket: String,
    public_read: bool,
}

impl GcsStorage {
    /// Create a new GcsStorage instance
    ///
    /// # Arguments
    /// * `bucket` - bucket name, e.g. `my-project.appspot.com`
    /// * `service_account_path` - service account key file; read once, at construction.
    ///   Falls back to `GOOGLE_*` environment variables when absent.
    /// * `public_read` - Upload objects with the `public-read` predefined ACL
    pub fn new(
        bucket: String,
        service_account_path: Option<&std::path::Path>,
        public_read: bool,
    ) -> StorageResult<Self> {
        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(bucket.clone());

        if let Some(path) = service_account_path {
            if !path.is_file() {
                return Err(StorageError::ConfigError(format!(
                    "Service account file not found: {}",
                    path.display()
                )));
            }
            builder = builder.with_service_account_path(path.to_string_lossy());
        }

        if public_read {
            builder = builder.with_client_options(public_read_client_options("x-goog-acl"));
        }

        let store = builder.build().map_err(|e| match e {
            object_store::Error::Unauthenticated { .. } => StorageError::AuthFailure(e.to_string()),
            other => StorageError::ConfigError(other.to_string()),
        })?;

        Ok(GcsStorage {
            store,
            bucket,
            public_read,
        })
    }
}

#[async_trait]
impl ObjectStorage for GcsStorage {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(classify(e, key)),
        }
    }

    async fn upload_file(
        &self,
        local_path: &std::path::Path,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let data = tokio::fs::read(local_path).await?;
        let size = data.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        self.store
            .put_opts(
                &location,
                PutPayload::from(Bytes::from(data)),
                put_options(content_type),
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "GCS upload failed"
                );
                classify(e, key)
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GCS upload successful"
        );

        Ok(())
    }

    async fn set_public(&self, key: &str) -> StorageResult<()> {
        // Same as S3: the predefined ACL travels with the upload request.
        if !self.public_read {
            tracing::debug!(bucket = %self.bucket, key = %key, "Public-read ACL disabled, relying on bucket IAM");
        }
        Ok(())
    }

    /// https://storage.googleapis.com/{bucket}/{key}
    fn public_url(&self, key: &str) -> String {
        format!("https://storage.googleapis.com/{}/{}", self.bucket, key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Gcs
    }
}
