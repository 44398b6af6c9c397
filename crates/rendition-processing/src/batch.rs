//! Batch runner: many sources, one ordered list of records.

use futures::stream::{self, StreamExt};
use rendition_core::{LogLevel, SourceDescriptor, VideoMetadataRecord};

use crate::error::PipelineError;
use crate::orchestrator::PipelineOrchestrator;
use crate::workspace::sweep_stale;

/// A source whose processing ended in a fatal error.
#[derive(Debug)]
pub struct SourceFailure {
    pub index: usize,
    pub url: String,
    pub error: PipelineError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Completed records, in input order
    pub records: Vec<VideoMetadataRecord>,
    pub skipped: usize,
    pub failures: Vec<SourceFailure>,
}

impl BatchOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Process `sources` with up to `concurrency` in flight.
///
/// One failing source never stops the others. Records keep the input order no
/// matter which source finishes first; skipped and failed sources leave no gap.
pub async fn run_batch(
    orchestrator: &PipelineOrchestrator,
    sources: &[SourceDescriptor],
    concurrency: usize,
) -> BatchOutcome {
    let start = std::time::Instant::now();

    if let Err(e) = sweep_stale(orchestrator.work_root()).await {
        tracing::warn!(error = %e, "Failed to sweep stale workspaces");
    }

    let results: Vec<_> = stream::iter(sources.iter().enumerate())
        .map(|(index, source)| async move { (index, source, orchestrator.process(source).await) })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut outcome = BatchOutcome::default();
    for (index, source, result) in results {
        match result {
            Ok(Some(record)) => outcome.records.push(record),
            Ok(None) => outcome.skipped += 1,
            Err(error) => {
                match error.log_level() {
                    LogLevel::Warn => tracing::warn!(
                        index = index,
                        url = %source.url,
                        kind = error.kind(),
                        error = %error,
                        "Source failed"
                    ),
                    LogLevel::Error => tracing::error!(
                        index = index,
                        url = %source.url,
                        kind = error.kind(),
                        error = %error,
                        "Source failed"
                    ),
                }
                outcome.failures.push(SourceFailure {
                    index,
                    url: source.url.clone(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        sources = sources.len(),
        records = outcome.records.len(),
        skipped = outcome.skipped,
        failed = outcome.failures.len(),
        uploads = orchestrator.store().upload_count(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Batch finished"
    );

    outcome
}
