//! Rendition Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the storage, processing and CLI crates of the rendition pipeline.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{PipelineConfig, RenditionConfig, RunConfig, StorageConfig, ToolConfig};
pub use error::{InvalidSource, LogLevel, ProbeError, ToolError};
pub use models::{
    PreviewEntry, PreviewRange, ProbedMedia, ProcessingStatus, RecordStatus, RenditionSize,
    SourceDescriptor, ThumbnailEntry, ThumbnailSet, VideoDetails, VideoMetadataRecord,
};
pub use storage_types::StorageBackend;
