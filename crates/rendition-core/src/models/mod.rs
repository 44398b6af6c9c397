//! Domain models for the rendition pipeline

pub mod media;
pub mod record;
pub mod source;

pub use media::{PreviewRange, ProbedMedia, RenditionSize};
pub use record::{
    PreviewEntry, ProcessingStatus, RecordStatus, ThumbnailEntry, ThumbnailSet, VideoDetails,
    VideoMetadataRecord,
};
pub use source::SourceDescriptor;
