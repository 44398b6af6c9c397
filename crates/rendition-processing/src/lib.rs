//! Rendition Processing Library
//!
//! The media rendition pipeline: probing a downloaded source, planning thumbnail
//! sizes, extracting thumbnails and preview clips through an external media tool,
//! and publishing everything through an idempotent `ArtifactStore`.
//!
//! # Flow per source
//!
//! workspace → download → probe → duration gate → thumbnails → previews → source
//! upload → `VideoMetadataRecord`.

pub mod batch;
pub mod error;
pub mod ffmpeg;
pub mod orchestrator;
pub mod planner;
pub mod preview;
pub mod probe;
pub mod thumbnail;
pub mod tool;
pub mod workspace;

pub use batch::{run_batch, BatchOutcome, SourceFailure};
pub use error::PipelineError;
pub use ffmpeg::FfmpegTool;
pub use orchestrator::{PipelineOrchestrator, PipelineState};
pub use planner::{compute_dimensions, plan_sizes};
pub use preview::PreviewClipGenerator;
pub use probe::MediaProbe;
pub use thumbnail::ThumbnailGenerator;
pub use tool::MediaTool;
pub use workspace::{sweep_stale, RunWorkspace};
