//! Rendition Storage Library
//!
//! Object storage abstraction for published renditions, with S3, Google Cloud
//! Storage, local filesystem and in-memory backends, plus the idempotent
//! `ArtifactStore` the pipeline publishes through.
//!
//! # Storage key format
//!
//! - thumbnails: `thumbnails/{video_name}/{size}/thumbnail_{offset}.jpg`
//! - previews: `previews/{video_name}/preview_{start}_{end}.mp4`
//! - source copies: `videos/{video_name}.mp4`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod artifact_store;
#[cfg(any(feature = "storage-s3", feature = "storage-gcs"))]
mod cloud;
pub mod factory;
#[cfg(feature = "storage-gcs")]
pub mod gcs;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use artifact_store::ArtifactStore;
pub use factory::create_storage;
#[cfg(feature = "storage-gcs")]
pub use gcs::GcsStorage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use rendition_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectStorage, StorageError, StorageResult};
