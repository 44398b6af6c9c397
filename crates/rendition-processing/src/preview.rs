//! PreviewClipGenerator - short stream-copied clips of streaming sources.

use rendition_core::{PreviewEntry, PreviewRange, SourceDescriptor, ToolError};
use rendition_storage::keys::preview_key;
use rendition_storage::ArtifactStore;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::tool::{require_output, MediaTool};

#[derive(Clone)]
pub struct PreviewClipGenerator {
    tool: Arc<dyn MediaTool>,
    store: ArtifactStore,
    ranges: Vec<PreviewRange>,
    streaming_extensions: Vec<String>,
    cancel: CancellationToken,
}

impl PreviewClipGenerator {
    pub fn new(
        tool: Arc<dyn MediaTool>,
        store: ArtifactStore,
        ranges: Vec<PreviewRange>,
        streaming_extensions: Vec<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            tool,
            store,
            ranges,
            streaming_extensions,
            cancel,
        }
    }

    pub fn applies_to(&self, source: &SourceDescriptor) -> bool {
        source.is_streaming_manifest(&self.streaming_extensions)
    }

    /// Cut and publish one clip per configured range, in order.
    ///
    /// Sources that are not streaming manifests get an empty list and the tool is
    /// never invoked. A failed range is logged and skipped.
    pub async fn generate(
        &self,
        source: &SourceDescriptor,
        video: &Path,
        video_name: &str,
        out_dir: &Path,
    ) -> Result<Vec<PreviewEntry>, PipelineError> {
        if !self.applies_to(source) {
            tracing::debug!(video_name = %video_name, "Not a streaming manifest, no previews");
            return Ok(Vec::new());
        }

        let mut previews = Vec::with_capacity(self.ranges.len());
        for range in &self.ranges {
            if self.cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            let local = out_dir.join(format!(
                "preview_{}_{}.mp4",
                range.start_secs, range.end_secs
            ));

            if let Err(e) = self.cut(video, *range, &local).await {
                tracing::warn!(
                    error = %e,
                    video_name = %video_name,
                    start_secs = range.start_secs,
                    end_secs = range.end_secs,
                    "Preview clip failed, skipping range"
                );
                continue;
            }

            let url = self
                .store
                .publish(&local, &preview_key(video_name, *range))
                .await?;
            previews.push(PreviewEntry::new(url, *range));
        }

        tracing::info!(
            video_name = %video_name,
            previews = previews.len(),
            "Previews generated"
        );

        Ok(previews)
    }

    async fn cut(&self, video: &Path, range: PreviewRange, output: &Path) -> Result<(), ToolError> {
        self.tool.cut_clip(video, range, output).await?;
        require_output(output).await
    }
}
