use rendition_core::{InvalidSource, LogLevel, ProbeError, ToolError};
use rendition_storage::StorageError;

/// Failure that ends the processing of one source.
///
/// Per-item tool failures (one thumbnail offset, one preview range) never become a
/// `PipelineError`; the generators log them and carry on.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidSource(#[from] InvalidSource),

    #[error("Download failed: {0}")]
    Download(#[source] ToolError),

    #[error("Probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("Storage operation failed: {0}")]
    Store(#[from] StorageError),

    #[error("Workspace I/O failed: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("Processing cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Short machine-readable category, used in batch summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidSource(_) => "invalid_source",
            PipelineError::Download(_) => "download",
            PipelineError::Probe(_) => "probe",
            PipelineError::Store(_) => "store",
            PipelineError::Workspace(_) => "workspace",
            PipelineError::Cancelled => "cancelled",
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            PipelineError::InvalidSource(_) | PipelineError::Cancelled => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}
