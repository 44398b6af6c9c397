//! The external media tool boundary.
//!
//! Every command the pipeline issues goes through `MediaTool`, so tests can swap the
//! real ffmpeg/ffprobe pair for a scripted fake.

use async_trait::async_trait;
use rendition_core::{PreviewRange, ToolError};
use std::path::Path;

#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Fetch `url` into `output` without re-encoding.
    async fn stream_copy(&self, url: &str, output: &Path) -> Result<(), ToolError>;

    /// Raw `key=value` lines with the container's `duration` and `bit_rate`.
    async fn query_format(&self, input: &Path) -> Result<String, ToolError>;

    /// Raw `WIDTHxHEIGHT` of the first video stream; empty when there is none.
    async fn query_dimensions(&self, input: &Path) -> Result<String, ToolError>;

    /// Write the frame at `offset_secs`, scaled to `width`x`height`, to `output`.
    async fn extract_frame(
        &self,
        input: &Path,
        offset_secs: u64,
        width: u32,
        height: u32,
        output: &Path,
    ) -> Result<(), ToolError>;

    /// Cut `range` out of `input` into `output` with stream copy.
    async fn cut_clip(
        &self,
        input: &Path,
        range: PreviewRange,
        output: &Path,
    ) -> Result<(), ToolError>;
}

/// A zero exit status only counts when the expected file is actually there.
pub async fn require_output(path: &Path) -> Result<(), ToolError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(()),
        _ => Err(ToolError::MissingOutput(path.to_path_buf())),
    }
}
