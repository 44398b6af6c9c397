use async_trait::async_trait;
use rendition_core::{PreviewRange, ToolError};
use rendition_processing::MediaTool;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// What the fake does for one frame extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Write,
    /// Non-zero exit
    Fail,
    /// Zero exit, but no file written
    NoFile,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Download(String),
    Format,
    Dimensions,
    Frame { offset: u64, width: u32, height: u32 },
    Clip(PreviewRange),
}

type FrameRule = Box<dyn Fn(u64, u32, u32) -> FrameOutcome + Send + Sync>;

/// Scripted `MediaTool`. The downloaded "file" contains its source URL, which is how
/// the format query and the default frame behavior find the duration configured for
/// that URL.
pub struct FakeTool {
    default_duration: f64,
    durations: HashMap<String, f64>,
    dimensions: String,
    bit_rate: String,
    failing_downloads: Vec<String>,
    silent_downloads: Vec<String>,
    frame_rule: Option<FrameRule>,
    failing_clips: Vec<PreviewRange>,
    silent_clips: Vec<PreviewRange>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTool {
    pub fn new() -> Self {
        Self {
            default_duration: 30.0,
            durations: HashMap::new(),
            dimensions: "1080x1920".to_string(),
            bit_rate: "4698624".to_string(),
            failing_downloads: Vec::new(),
            silent_downloads: Vec::new(),
            frame_rule: None,
            failing_clips: Vec::new(),
            silent_clips: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_duration(mut self, url: &str, seconds: f64) -> Self {
        self.durations.insert(url.to_string(), seconds);
        self
    }

    pub fn with_default_duration(mut self, seconds: f64) -> Self {
        self.default_duration = seconds;
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = format!("{}x{}", width, height);
        self
    }

    pub fn without_video_stream(mut self) -> Self {
        self.dimensions = String::new();
        self
    }

    pub fn with_bit_rate(mut self, bit_rate: &str) -> Self {
        self.bit_rate = bit_rate.to_string();
        self
    }

    pub fn with_failing_download(mut self, url: &str) -> Self {
        self.failing_downloads.push(url.to_string());
        self
    }

    pub fn with_frame_rule(
        mut self,
        rule: impl Fn(u64, u32, u32) -> FrameOutcome + Send + Sync + 'static,
    ) -> Self {
        self.frame_rule = Some(Box::new(rule));
        self
    }

    pub fn with_failing_clip(mut self, range: PreviewRange) -> Self {
        self.failing_clips.push(range);
        self
    }

    /// Download exits 0 but writes nothing.
    pub fn with_silent_download(mut self, url: &str) -> Self {
        self.silent_downloads.push(url.to_string());
        self
    }

    /// Clip exits 0 but writes nothing.
    pub fn with_silent_clip(mut self, range: PreviewRange) -> Self {
        self.silent_clips.push(range);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn frame_calls(&self) -> Vec<(u64, u32, u32)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Frame {
                    offset,
                    width,
                    height,
                } => Some((offset, width, height)),
                _ => None,
            })
            .collect()
    }

    pub fn clip_calls(&self) -> Vec<PreviewRange> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Clip(range) => Some(range),
                _ => None,
            })
            .collect()
    }

    fn duration_of(&self, url: &str) -> f64 {
        self.durations
            .get(url)
            .copied()
            .unwrap_or(self.default_duration)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(program: &str) -> ToolError {
        ToolError::NonZeroExit {
            program: program.to_string(),
            status: "exit status: 1".to_string(),
            stderr: "scripted failure".to_string(),
        }
    }
}

#[async_trait]
impl MediaTool for FakeTool {
    async fn stream_copy(&self, url: &str, output: &Path) -> Result<(), ToolError> {
        self.record(Call::Download(url.to_string()));
        if self.failing_downloads.iter().any(|u| u == url) {
            return Err(Self::failure("ffmpeg"));
        }
        if self.silent_downloads.iter().any(|u| u == url) {
            return Ok(());
        }
        tokio::fs::write(output, url.as_bytes()).await.unwrap();
        Ok(())
    }

    async fn query_format(&self, input: &Path) -> Result<String, ToolError> {
        self.record(Call::Format);
        let url = tokio::fs::read_to_string(input).await.unwrap();
        let duration = self.duration_of(&url);
        Ok(format!("duration={}\nbit_rate={}\n", duration, self.bit_rate))
    }

    async fn query_dimensions(&self, _input: &Path) -> Result<String, ToolError> {
        self.record(Call::Dimensions);
        Ok(format!("{}\n", self.dimensions))
    }

    async fn extract_frame(
        &self,
        input: &Path,
        offset_secs: u64,
        width: u32,
        height: u32,
        output: &Path,
    ) -> Result<(), ToolError> {
        self.record(Call::Frame {
            offset: offset_secs,
            width,
            height,
        });
        let outcome = match &self.frame_rule {
            Some(rule) => rule(offset_secs, width, height),
            // Like ffmpeg: seeking past the end exits 0 without writing a frame
            None => {
                let url = tokio::fs::read_to_string(input).await.unwrap();
                if offset_secs as f64 <= self.duration_of(&url) {
                    FrameOutcome::Write
                } else {
                    FrameOutcome::NoFile
                }
            }
        };
        match outcome {
            FrameOutcome::Write => {
                tokio::fs::write(output, b"jpeg").await.unwrap();
                Ok(())
            }
            FrameOutcome::Fail => Err(Self::failure("ffmpeg")),
            FrameOutcome::NoFile => Ok(()),
        }
    }

    async fn cut_clip(
        &self,
        _input: &Path,
        range: PreviewRange,
        output: &Path,
    ) -> Result<(), ToolError> {
        self.record(Call::Clip(range));
        if self.failing_clips.contains(&range) {
            return Err(Self::failure("ffmpeg"));
        }
        if self.silent_clips.contains(&range) {
            return Ok(());
        }
        tokio::fs::write(output, b"mp4").await.unwrap();
        Ok(())
    }
}
