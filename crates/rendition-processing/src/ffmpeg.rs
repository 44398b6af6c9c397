//! `MediaTool` backed by the ffmpeg / ffprobe binaries.

use async_trait::async_trait;
use rendition_core::{PreviewRange, ToolConfig, ToolError};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::tool::MediaTool;

/// Validate that a tool path doesn't contain shell metacharacters or dangerous sequences
fn validate_path(path: &str) -> Result<(), ToolError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ToolError::InvalidArgument(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(ToolError::InvalidArgument(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

/// Run `program` to completion and return its stdout.
///
/// The child is killed if `timeout` elapses first.
async fn run_tool<I, S>(program: &str, args: I, timeout: Duration) -> Result<Vec<u8>, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let start = std::time::Instant::now();

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ToolError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ToolError::Spawn {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            tracing::warn!(
                program = %program,
                timeout_secs = timeout.as_secs(),
                "Tool invocation timed out, child killed"
            );
            return Err(ToolError::TimedOut {
                program: program.to_string(),
                secs: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        return Err(ToolError::NonZeroExit {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    tracing::debug!(
        program = %program,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Tool invocation finished"
    );

    Ok(output.stdout)
}

#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

impl FfmpegTool {
    pub fn new(config: &ToolConfig) -> Result<Self, ToolError> {
        validate_path(&config.ffmpeg_path)?;
        validate_path(&config.ffprobe_path)?;

        Ok(Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "stream_copy"
    ))]
    async fn stream_copy(&self, url: &str, output: &Path) -> Result<(), ToolError> {
        let args: [&OsStr; 8] = [
            "-y".as_ref(),
            "-v".as_ref(),
            "error".as_ref(),
            "-i".as_ref(),
            url.as_ref(),
            "-c".as_ref(),
            "copy".as_ref(),
            output.as_os_str(),
        ];
        run_tool(&self.ffmpeg_path, args, self.timeout).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe_format"
    ))]
    async fn query_format(&self, input: &Path) -> Result<String, ToolError> {
        let args: [&OsStr; 7] = [
            "-v".as_ref(),
            "error".as_ref(),
            "-show_entries".as_ref(),
            "format=duration,bit_rate".as_ref(),
            "-of".as_ref(),
            "default=noprint_wrappers=1".as_ref(),
            input.as_os_str(),
        ];
        let stdout = run_tool(&self.ffprobe_path, args, self.timeout).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe_dimensions"
    ))]
    async fn query_dimensions(&self, input: &Path) -> Result<String, ToolError> {
        let args: [&OsStr; 9] = [
            "-v".as_ref(),
            "error".as_ref(),
            "-select_streams".as_ref(),
            "v:0".as_ref(),
            "-show_entries".as_ref(),
            "stream=width,height".as_ref(),
            "-of".as_ref(),
            "csv=s=x:p=0".as_ref(),
            input.as_os_str(),
        ];
        let stdout = run_tool(&self.ffprobe_path, args, self.timeout).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "extract_frame"
    ))]
    async fn extract_frame(
        &self,
        input: &Path,
        offset_secs: u64,
        width: u32,
        height: u32,
        output: &Path,
    ) -> Result<(), ToolError> {
        let offset = offset_secs.to_string();
        let size = format!("{}x{}", width, height);
        let args: [&OsStr; 12] = [
            "-y".as_ref(),
            "-v".as_ref(),
            "error".as_ref(),
            "-i".as_ref(),
            input.as_os_str(),
            "-ss".as_ref(),
            offset.as_ref(),
            "-vframes".as_ref(),
            "1".as_ref(),
            "-s".as_ref(),
            size.as_ref(),
            output.as_os_str(),
        ];
        run_tool(&self.ffmpeg_path, args, self.timeout).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "cut_clip"
    ))]
    async fn cut_clip(
        &self,
        input: &Path,
        range: PreviewRange,
        output: &Path,
    ) -> Result<(), ToolError> {
        let start = range.start_secs.to_string();
        let end = range.end_secs.to_string();
        let args: [&OsStr; 12] = [
            "-y".as_ref(),
            "-v".as_ref(),
            "error".as_ref(),
            "-i".as_ref(),
            input.as_os_str(),
            "-ss".as_ref(),
            start.as_ref(),
            "-to".as_ref(),
            end.as_ref(),
            "-c".as_ref(),
            "copy".as_ref(),
            output.as_os_str(),
        ];
        run_tool(&self.ffmpeg_path, args, self.timeout).await?;
        Ok(())
    }
}
