//! ThumbnailGenerator - a time series of frames per size class.
//!
//! Offsets advance by a fixed interval. At each offset every size class is tried in
//! order; a failure only costs that size class at that offset. The series ends at the
//! first offset where no size class produced a frame.

use rendition_core::{LogLevel, ProbedMedia, RenditionSize, ThumbnailEntry, ThumbnailSet, ToolError};
use rendition_storage::keys::thumbnail_key;
use rendition_storage::ArtifactStore;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::planner::compute_dimensions;
use crate::tool::{require_output, MediaTool};

#[derive(Clone)]
pub struct ThumbnailGenerator {
    tool: Arc<dyn MediaTool>,
    store: ArtifactStore,
    interval_secs: u64,
    sizes: Vec<RenditionSize>,
    cancel: CancellationToken,
}

impl ThumbnailGenerator {
    pub fn new(
        tool: Arc<dyn MediaTool>,
        store: ArtifactStore,
        interval_secs: u64,
        sizes: Vec<RenditionSize>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            tool,
            store,
            interval_secs: interval_secs.max(1),
            sizes,
            cancel,
        }
    }

    /// Extract and publish thumbnails of `video` into `out_dir`.
    ///
    /// Each frame is published as soon as it exists, so the returned set only ever
    /// references objects already in the store. Store failures abort the source.
    pub async fn generate(
        &self,
        video: &Path,
        video_name: &str,
        probed: &ProbedMedia,
        out_dir: &Path,
    ) -> Result<ThumbnailSet, PipelineError> {
        let start = std::time::Instant::now();
        let plan: Vec<_> = self
            .sizes
            .iter()
            .map(|size| {
                let (width, height) =
                    compute_dimensions(probed.width, probed.height, size.base_dimension());
                (*size, width, height)
            })
            .collect();

        for size in &self.sizes {
            tokio::fs::create_dir_all(out_dir.join(size.as_str())).await?;
        }

        let mut thumbnails = ThumbnailSet::with_sizes(&self.sizes);
        let mut offset = 0u64;

        loop {
            let mut produced = 0;
            for (size, width, height) in &plan {
                if self.cancel.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }

                let local = out_dir
                    .join(size.as_str())
                    .join(format!("thumbnail_{}.jpg", offset));

                match self.extract(video, offset, *width, *height, &local).await {
                    Ok(()) => {
                        let key = thumbnail_key(video_name, *size, offset);
                        let url = self.store.publish(&local, &key).await?;
                        thumbnails.push(ThumbnailEntry {
                            size: *size,
                            url,
                            offset_seconds: offset,
                        });
                        produced += 1;
                    }
                    Err(e) => log_frame_failure(&e, video_name, *size, offset),
                }
            }

            if produced == 0 {
                tracing::info!(
                    video_name = %video_name,
                    offset_secs = offset,
                    "No size class produced a frame, ending thumbnail series"
                );
                break;
            }

            offset += self.interval_secs;
        }

        tracing::info!(
            video_name = %video_name,
            thumbnails = thumbnails.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnails generated"
        );

        Ok(thumbnails)
    }

    async fn extract(
        &self,
        video: &Path,
        offset: u64,
        width: u32,
        height: u32,
        output: &Path,
    ) -> Result<(), ToolError> {
        self.tool
            .extract_frame(video, offset, width, height, output)
            .await?;
        require_output(output).await
    }
}

fn log_frame_failure(error: &ToolError, video_name: &str, size: RenditionSize, offset: u64) {
    match error.log_level() {
        LogLevel::Warn => tracing::warn!(
            error = %error,
            video_name = %video_name,
            size_class = %size,
            offset_secs = offset,
            "Thumbnail extraction failed"
        ),
        LogLevel::Error => tracing::error!(
            error = %error,
            video_name = %video_name,
            size_class = %size,
            offset_secs = offset,
            recoverable = error.is_recoverable(),
            "Thumbnail extraction failed"
        ),
    }
}
