use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::ProbeError;

/// Technical properties measured from a downloaded source file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbedMedia {
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    /// Container bitrate, when the probe tool reports one
    pub bitrate_kbps: Option<f64>,
}

impl ProbedMedia {
    pub fn new(
        duration_seconds: f64,
        width: u32,
        height: u32,
        bitrate_kbps: Option<f64>,
    ) -> Result<Self, ProbeError> {
        if !duration_seconds.is_finite() || duration_seconds < 0.0 {
            return Err(ProbeError::MalformedOutput(format!(
                "duration must be a non-negative number, got {}",
                duration_seconds
            )));
        }
        if width == 0 || height == 0 {
            return Err(ProbeError::MalformedOutput(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }

        Ok(Self {
            duration_seconds,
            width,
            height,
            bitrate_kbps: bitrate_kbps.filter(|b| b.is_finite() && *b >= 0.0),
        })
    }

    /// Duration in whole milliseconds, truncated.
    pub fn duration_ms(&self) -> u64 {
        (self.duration_seconds * 1000.0) as u64
    }
}

/// Named thumbnail resolution tier.
///
/// Declaration order is the iteration order used when generating thumbnails.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RenditionSize {
    #[default]
    Small,
    Medium,
}

impl RenditionSize {
    pub const ALL: [RenditionSize; 2] = [RenditionSize::Small, RenditionSize::Medium];

    /// Pixel length of the longer output edge.
    pub fn base_dimension(&self) -> u32 {
        match self {
            RenditionSize::Small => 320,
            RenditionSize::Medium => 640,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenditionSize::Small => "small",
            RenditionSize::Medium => "medium",
        }
    }
}

impl FromStr for RenditionSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(RenditionSize::Small),
            "medium" => Ok(RenditionSize::Medium),
            _ => Err(anyhow::anyhow!("Unknown rendition size: {}", s)),
        }
    }
}

impl Display for RenditionSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Time range, in whole seconds, of one preview clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRange {
    pub start_secs: u64,
    pub end_secs: u64,
}

impl PreviewRange {
    pub fn new(start_secs: u64, end_secs: u64) -> Result<Self, anyhow::Error> {
        if start_secs >= end_secs {
            return Err(anyhow::anyhow!(
                "Preview range start ({}) must be before end ({})",
                start_secs,
                end_secs
            ));
        }
        Ok(Self {
            start_secs,
            end_secs,
        })
    }

    pub fn start_ms(&self) -> u64 {
        self.start_secs * 1000
    }

    pub fn end_ms(&self) -> u64 {
        self.end_secs * 1000
    }
}

impl FromStr for PreviewRange {
    type Err = anyhow::Error;

    /// Parses `start-end`, e.g. `5-10`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow::anyhow!("Preview range must look like start-end: {}", s))?;
        let start = start
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("Invalid preview range start: {}", s))?;
        let end = end
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("Invalid preview range end: {}", s))?;
        PreviewRange::new(start, end)
    }
}
