//! MediaProbe - duration, dimensions and bitrate of a local source file.

use rendition_core::{ProbeError, ProbedMedia};
use std::path::Path;
use std::sync::Arc;

use crate::tool::MediaTool;

/// Reads technical properties of a downloaded file. Never mutates it.
#[derive(Clone)]
pub struct MediaProbe {
    tool: Arc<dyn MediaTool>,
}

impl MediaProbe {
    pub fn new(tool: Arc<dyn MediaTool>) -> Self {
        Self { tool }
    }

    /// Probe `path`. No retry: the same file always yields the same answer.
    pub async fn probe(&self, path: &Path) -> Result<ProbedMedia, ProbeError> {
        let start = std::time::Instant::now();

        let format = self
            .tool
            .query_format(path)
            .await
            .map_err(ProbeError::ToolInvocationFailed)?;
        let (duration_seconds, bitrate_kbps) = parse_format(&format)?;

        let dimensions = self
            .tool
            .query_dimensions(path)
            .await
            .map_err(ProbeError::ToolInvocationFailed)?;
        let (width, height) = parse_dimensions(&dimensions)?;

        let probed = ProbedMedia::new(duration_seconds, width, height, bitrate_kbps)?;

        tracing::info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            video_duration = probed.duration_seconds,
            width = probed.width,
            height = probed.height,
            bitrate_kbps = ?probed.bitrate_kbps,
            "Video probe completed"
        );

        Ok(probed)
    }
}

/// Parse `duration=<secs>` and `bit_rate=<bits/s>` lines.
///
/// A missing or `N/A` bit rate is not an error; a missing duration is.
fn parse_format(output: &str) -> Result<(f64, Option<f64>), ProbeError> {
    let mut duration = None;
    let mut bitrate = None;

    for line in output.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "duration" => {
                duration = Some(value.parse::<f64>().map_err(|_| {
                    ProbeError::MalformedOutput(format!("duration is not a number: {:?}", value))
                })?);
            }
            "bit_rate" => {
                bitrate = value.parse::<f64>().ok().map(|bits| bits / 1000.0);
            }
            _ => {}
        }
    }

    let duration = duration.ok_or_else(|| {
        ProbeError::MalformedOutput(format!("no duration in probe output: {:?}", output.trim()))
    })?;

    Ok((duration, bitrate))
}

/// Parse the first `WIDTHxHEIGHT` line. No line at all means no video stream.
fn parse_dimensions(output: &str) -> Result<(u32, u32), ProbeError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or(ProbeError::NoVideoStream)?;

    let mut parts = line.split('x').filter(|part| !part.is_empty());
    let (Some(width), Some(height)) = (parts.next(), parts.next()) else {
        return Err(ProbeError::MalformedOutput(format!(
            "expected WIDTHxHEIGHT, got {:?}",
            line
        )));
    };

    let parse = |value: &str| {
        value.trim().parse::<u32>().map_err(|_| {
            ProbeError::MalformedOutput(format!("expected WIDTHxHEIGHT, got {:?}", line))
        })
    };

    Ok((parse(width)?, parse(height)?))
}
