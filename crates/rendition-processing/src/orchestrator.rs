//! Per-source pipeline: download → probe → renditions → source upload → record.

use rendition_core::{
    PipelineConfig, ProbedMedia, SourceDescriptor, VideoDetails, VideoMetadataRecord,
};
use rendition_storage::keys::source_key;
use rendition_storage::ArtifactStore;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::preview::PreviewClipGenerator;
use crate::probe::MediaProbe;
use crate::thumbnail::ThumbnailGenerator;
use crate::tool::{require_output, MediaTool};
use crate::workspace::RunWorkspace;

/// Stages a source passes through. `Skipped` and `Done` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Cleaned,
    Downloaded,
    Probed,
    Skipped,
    ThumbnailsDone,
    PreviewsDone,
    Published,
    Done,
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            PipelineState::Init => "init",
            PipelineState::Cleaned => "cleaned",
            PipelineState::Downloaded => "downloaded",
            PipelineState::Probed => "probed",
            PipelineState::Skipped => "skipped",
            PipelineState::ThumbnailsDone => "thumbnails_done",
            PipelineState::PreviewsDone => "previews_done",
            PipelineState::Published => "published",
            PipelineState::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Runs the full pipeline for one source at a time. Cheap to share across tasks;
/// all per-run state lives in the run's own workspace.
pub struct PipelineOrchestrator {
    tool: Arc<dyn MediaTool>,
    store: ArtifactStore,
    probe: MediaProbe,
    thumbnails: ThumbnailGenerator,
    previews: PreviewClipGenerator,
    work_root: PathBuf,
    min_duration_secs: f64,
    codec_label: String,
    cancel: CancellationToken,
}

impl PipelineOrchestrator {
    pub fn new(
        config: &PipelineConfig,
        tool: Arc<dyn MediaTool>,
        store: ArtifactStore,
        cancel: CancellationToken,
    ) -> Self {
        let renditions = &config.renditions;
        Self {
            probe: MediaProbe::new(tool.clone()),
            thumbnails: ThumbnailGenerator::new(
                tool.clone(),
                store.clone(),
                renditions.thumbnail_interval_secs,
                renditions.thumbnail_sizes.clone(),
                cancel.clone(),
            ),
            previews: PreviewClipGenerator::new(
                tool.clone(),
                store.clone(),
                renditions.preview_ranges.clone(),
                renditions.streaming_extensions.clone(),
                cancel.clone(),
            ),
            tool,
            store,
            work_root: config.run.work_dir.clone(),
            min_duration_secs: renditions.min_duration_secs,
            codec_label: renditions.codec_label.clone(),
            cancel,
        }
    }

    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Process one source.
    ///
    /// Returns `Ok(None)` when the source is shorter than the minimum duration. The
    /// workspace is removed on every exit path; artifacts already published stay in
    /// the store and short-circuit on the next attempt.
    #[tracing::instrument(skip(self, source), fields(url = %source.url))]
    pub async fn process(
        &self,
        source: &SourceDescriptor,
    ) -> Result<Option<VideoMetadataRecord>, PipelineError> {
        let start = std::time::Instant::now();
        let source = source.clone().validated()?;
        let video_name = source.video_name()?;
        let mut state = PipelineState::Init;

        let workspace = RunWorkspace::create(&self.work_root).await?;
        self.advance(&mut state, PipelineState::Cleaned, &video_name);

        self.ensure_active()?;
        let local_source = workspace.source_path();
        self.tool
            .stream_copy(&source.url, &local_source)
            .await
            .map_err(PipelineError::Download)?;
        require_output(&local_source)
            .await
            .map_err(PipelineError::Download)?;
        self.advance(&mut state, PipelineState::Downloaded, &video_name);

        self.ensure_active()?;
        let probed = self.probe.probe(&local_source).await?;
        self.advance(&mut state, PipelineState::Probed, &video_name);

        if probed.duration_seconds < self.min_duration_secs {
            tracing::info!(
                video_name = %video_name,
                video_duration = probed.duration_seconds,
                min_duration_secs = self.min_duration_secs,
                "Source too short, skipping"
            );
            self.advance(&mut state, PipelineState::Skipped, &video_name);
            return Ok(None);
        }
        warn_on_hint_mismatch(&source, &probed, &video_name);

        let thumbnails = self
            .thumbnails
            .generate(&local_source, &video_name, &probed, &workspace.thumbnails_dir())
            .await?;
        self.advance(&mut state, PipelineState::ThumbnailsDone, &video_name);

        let previews = self
            .previews
            .generate(&source, &local_source, &video_name, &workspace.previews_dir())
            .await?;
        self.advance(&mut state, PipelineState::PreviewsDone, &video_name);

        self.ensure_active()?;
        let video_url = self
            .store
            .publish(&local_source, &source_key(&video_name))
            .await?;
        self.advance(&mut state, PipelineState::Published, &video_name);

        let metadata =
            VideoDetails::from_probe(&probed, source.expected_bitrate_kbps, &self.codec_label);
        let record = VideoMetadataRecord::completed(video_url, metadata, thumbnails, previews);
        self.advance(&mut state, PipelineState::Done, &video_name);

        tracing::info!(
            video_name = %video_name,
            video_id = %record.video_id,
            thumbnails = record.thumbnails.len(),
            previews = record.previews.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Source processed"
        );

        Ok(Some(record))
    }

    fn ensure_active(&self) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }

    fn advance(&self, state: &mut PipelineState, next: PipelineState, video_name: &str) {
        tracing::debug!(video_name = %video_name, from = %state, to = %next, "Pipeline state transition");
        *state = next;
    }
}

/// The record trusts the probe; hints that disagree are worth a log line.
fn warn_on_hint_mismatch(source: &SourceDescriptor, probed: &ProbedMedia, video_name: &str) {
    let hinted = (source.expected_width, source.expected_height);
    let measured = (f64::from(probed.width), f64::from(probed.height));
    if hinted != (0.0, 0.0) && hinted != measured {
        tracing::warn!(
            video_name = %video_name,
            hinted_width = source.expected_width,
            hinted_height = source.expected_height,
            width = probed.width,
            height = probed.height,
            "Dimension hints differ from probed dimensions, using probed values"
        );
    }
}
