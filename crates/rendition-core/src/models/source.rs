use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::InvalidSource;

/// One remote video to ingest.
///
/// The `expected_*` fields are hints supplied by the caller; the pipeline measures
/// the downloaded file itself and only falls back to the bitrate hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SourceDescriptor {
    #[validate(url(message = "Source url must be an absolute URL"))]
    pub url: String,
    #[serde(rename = "width")]
    #[validate(range(min = 0.0, max = 100000.0, message = "Width hint out of range"))]
    pub expected_width: f64,
    #[serde(rename = "height")]
    #[validate(range(min = 0.0, max = 100000.0, message = "Height hint out of range"))]
    pub expected_height: f64,
    #[serde(rename = "bitrate")]
    #[validate(range(min = 0.0, max = 10000000.0, message = "Bitrate hint out of range"))]
    pub expected_bitrate_kbps: f64,
}

impl SourceDescriptor {
    pub fn new(
        url: impl Into<String>,
        expected_width: f64,
        expected_height: f64,
        expected_bitrate_kbps: f64,
    ) -> Result<Self, InvalidSource> {
        Self {
            url: url.into(),
            expected_width,
            expected_height,
            expected_bitrate_kbps,
        }
        .validated()
    }

    /// Check field ranges and that a usable video name can be derived.
    ///
    /// Used for descriptors that arrive through deserialization.
    pub fn validated(self) -> Result<Self, InvalidSource> {
        let hints = [
            self.expected_width,
            self.expected_height,
            self.expected_bitrate_kbps,
        ];
        if hints.iter().any(|h| !h.is_finite()) {
            return Err(InvalidSource::new(&self.url, "Hints must be finite numbers"));
        }
        if let Err(errors) = self.validate() {
            return Err(InvalidSource::new(&self.url, errors.to_string()));
        }
        self.video_name()?;
        Ok(self)
    }

    /// Name used in every remote key of this source: the last path segment of the
    /// URL without its extension.
    pub fn video_name(&self) -> Result<String, InvalidSource> {
        let path = strip_query(&self.url);
        let file_name = path.rsplit('/').next().unwrap_or_default();
        let stem = match file_name.rfind('.') {
            Some(idx) if idx > 0 => &file_name[..idx],
            _ => file_name,
        };

        if stem.is_empty() || stem == "." || stem.contains("..") {
            return Err(InvalidSource::new(
                &self.url,
                "URL path does not end in a file name",
            ));
        }
        if stem.chars().any(|c| c.is_control() || c == '\\') {
            return Err(InvalidSource::new(
                &self.url,
                "File name contains unsupported characters",
            ));
        }

        Ok(stem.to_string())
    }

    /// Whether the URL path ends in one of the given streaming-manifest extensions.
    pub fn is_streaming_manifest<S: AsRef<str>>(&self, extensions: &[S]) -> bool {
        let path = strip_query(&self.url);
        extensions.iter().any(|ext| path.ends_with(ext.as_ref()))
    }
}

fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
