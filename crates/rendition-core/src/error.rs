//! Error types module
//!
//! Errors raised at the external-tool boundary and while validating input. Storage
//! errors live in `rendition-storage`; the pipeline-level error that unifies them
//! lives in `rendition-processing`.

use std::path::PathBuf;

/// Log level an error should be reported at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected per-item failures (one thumbnail offset, one preview range)
    Warn,
    /// Failures that abort a source
    Error,
}

/// Failure of one external tool invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Expected output file was not produced: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("{program} timed out after {secs}s")]
    TimedOut { program: String, secs: u64 },

    #[error("Invalid tool argument: {0}")]
    InvalidArgument(String),
}

impl ToolError {
    /// Whether a retry of the same invocation could plausibly succeed.
    ///
    /// Timeouts and spawn failures depend on machine state; a non-zero exit or a
    /// missing output file is deterministic for the same input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ToolError::TimedOut { .. } | ToolError::Spawn { .. })
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            ToolError::NonZeroExit { .. } | ToolError::MissingOutput(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// Failure to derive `ProbedMedia` from a local file. Always fatal for the source.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Probe tool invocation failed: {0}")]
    ToolInvocationFailed(#[source] ToolError),

    #[error("No video stream found")]
    NoVideoStream,

    #[error("Malformed probe output: {0}")]
    MalformedOutput(String),
}

/// A `SourceDescriptor` that failed validation. Rejected before any I/O.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid source {url}: {reason}")]
pub struct InvalidSource {
    pub url: String,
    pub reason: String,
}

impl InvalidSource {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
