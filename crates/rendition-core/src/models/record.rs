use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use super::media::{PreviewRange, ProbedMedia, RenditionSize};

/// One published thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailEntry {
    /// Carried by the enclosing `ThumbnailSet` key on the wire
    #[serde(skip_serializing)]
    pub size: RenditionSize,
    #[serde(rename = "thumbnailUrl")]
    pub url: String,
    #[serde(rename = "time")]
    pub offset_seconds: u64,
}

/// Published thumbnails grouped by size class, each list ordered by offset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThumbnailSet(BTreeMap<RenditionSize, Vec<ThumbnailEntry>>);

impl ThumbnailSet {
    /// Empty set with one (empty) list per size class, so every configured class
    /// shows up in the output even when nothing was generated for it.
    pub fn with_sizes(sizes: &[RenditionSize]) -> Self {
        Self(sizes.iter().map(|size| (*size, Vec::new())).collect())
    }

    pub fn push(&mut self, entry: ThumbnailEntry) {
        self.0.entry(entry.size).or_default().push(entry);
    }

    pub fn entries(&self, size: RenditionSize) -> &[ThumbnailEntry] {
        self.0.get(&size).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of thumbnails across all size classes.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One published preview clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewEntry {
    pub url: String,
    #[serde(rename = "start_time")]
    pub start_ms: u64,
    #[serde(rename = "end_time")]
    pub end_ms: u64,
}

impl PreviewEntry {
    pub fn new(url: String, range: PreviewRange) -> Self {
        Self {
            url,
            start_ms: range.start_ms(),
            end_ms: range.end_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Completed,
}

impl Display for ProcessingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProcessingStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Technical block of a metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    /// Milliseconds
    pub duration: u64,
    pub width: f64,
    pub height: f64,
    /// e.g. `4698kbps`
    pub bitrate: String,
    pub codec: String,
}

impl VideoDetails {
    /// Measured values win; the bitrate hint is only used when the probe did not
    /// report a container bitrate.
    pub fn from_probe(probed: &ProbedMedia, bitrate_hint_kbps: f64, codec: &str) -> Self {
        let bitrate_kbps = probed.bitrate_kbps.unwrap_or(bitrate_hint_kbps);
        Self {
            duration: probed.duration_ms(),
            width: f64::from(probed.width),
            height: f64::from(probed.height),
            bitrate: format!("{}kbps", bitrate_kbps.trunc() as i64),
            codec: codec.to_string(),
        }
    }
}

/// Final, immutable description of one processed source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoMetadataRecord {
    pub status: RecordStatus,
    pub video_id: Uuid,
    pub processing_status: ProcessingStatus,
    pub video_url: String,
    pub metadata: VideoDetails,
    pub thumbnails: ThumbnailSet,
    pub previews: Vec<PreviewEntry>,
}

impl VideoMetadataRecord {
    /// Assemble a completed record under a freshly generated id.
    pub fn completed(
        video_url: String,
        metadata: VideoDetails,
        thumbnails: ThumbnailSet,
        previews: Vec<PreviewEntry>,
    ) -> Self {
        Self {
            status: RecordStatus::Success,
            video_id: Uuid::new_v4(),
            processing_status: ProcessingStatus::Completed,
            video_url,
            metadata,
            thumbnails,
            previews,
        }
    }
}
