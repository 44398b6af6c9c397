//! Shared key generation for storage backends.
//!
//! The layout is part of the published contract: existing objects are found again
//! on re-runs only if the same key is produced for the same rendition.

use rendition_core::{PreviewRange, RenditionSize};

use crate::traits::{StorageError, StorageResult};

/// `thumbnails/{video_name}/{size}/thumbnail_{offset}.jpg`
pub fn thumbnail_key(video_name: &str, size: RenditionSize, offset_secs: u64) -> String {
    format!(
        "thumbnails/{}/{}/thumbnail_{}.jpg",
        video_name,
        size.as_str(),
        offset_secs
    )
}

/// `previews/{video_name}/preview_{start}_{end}.mp4`
pub fn preview_key(video_name: &str, range: PreviewRange) -> String {
    format!(
        "previews/{}/preview_{}_{}.mp4",
        video_name, range.start_secs, range.end_secs
    )
}

/// `videos/{video_name}.mp4`
pub fn source_key(video_name: &str) -> String {
    format!("videos/{}.mp4", video_name)
}

/// Reject keys that could escape a bucket prefix or a local storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// MIME type derived from the key's extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    match key.rsplit('.').next().map(str::to_lowercase).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("mp4") => "video/mp4",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
