//! Pipeline-wide constants.

/// Sources shorter than this are skipped without producing a record.
pub const MIN_PROCESSING_DURATION_SECS: f64 = 10.0;

/// Seconds between two thumbnail offsets.
pub const THUMBNAIL_INTERVAL_SECS: u64 = 1;

/// Preview clip ranges, in seconds, cut from streaming sources.
pub const PREVIEW_RANGES_SECS: [(u64, u64); 2] = [(5, 10), (15, 20)];

/// Extensions that mark a source URL as a streaming manifest.
pub const STREAMING_MANIFEST_EXTENSIONS: [&str; 2] = [".hls", ".dash"];

/// Codec label written into every metadata record.
pub const DEFAULT_CODEC_LABEL: &str = "H.264";

/// Upper bound for a single external tool invocation.
pub const TOOL_TIMEOUT_SECS: u64 = 300;

/// Prefix of per-source workspace directories under the work root.
pub const WORKSPACE_DIR_PREFIX: &str = "rendition-";

/// Directory under the system temp dir used as the default work root.
pub const DEFAULT_WORK_DIR_NAME: &str = "rendition-work";

/// File inside each workspace naming the process that owns it.
pub const WORKSPACE_OWNER_FILE: &str = ".owner";
