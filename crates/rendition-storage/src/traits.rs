//! Storage abstraction trait
//!
//! This module defines the `ObjectStorage` trait that all storage backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Remote object store operations the pipeline relies on.
///
/// Implementations never retry; retry policy belongs to the caller.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Check if an object exists under `key`
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Upload the full contents of a local file under `key`
    async fn upload_file(&self, local_path: &Path, key: &str, content_type: &str)
        -> StorageResult<()>;

    /// Make the object under `key` publicly readable
    async fn set_public(&self, key: &str) -> StorageResult<()>;

    /// Publicly reachable URL of `key`. Does not check existence.
    fn public_url(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
