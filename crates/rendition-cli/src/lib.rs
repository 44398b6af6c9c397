//! Process-edge helpers for the `rendition` binary: logging, the sources file, the
//! output file and signal handling.

use anyhow::Context;
use rendition_core::{InvalidSource, SourceDescriptor, VideoMetadataRecord};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing: console output plus, when `log_file` is set, an append-only
/// plain-text copy of every line in that file.
///
/// `json_console` switches the console layer to JSON lines (production).
pub fn init_tracing(log_file: Option<&Path>, json_console: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    let (plain_console, json_layer) = if json_console {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain_console)
        .with(json_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize tracing")?;

    Ok(())
}

/// Read a JSON array of sources. Entries that fail validation are returned
/// separately instead of failing the whole file.
pub fn load_sources(path: &Path) -> anyhow::Result<(Vec<SourceDescriptor>, Vec<InvalidSource>)> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sources file {}", path.display()))?;
    let entries: Vec<SourceDescriptor> = serde_json::from_str(&raw)
        .with_context(|| format!("Sources file {} is not a JSON array of sources", path.display()))?;

    let mut valid = Vec::with_capacity(entries.len());
    let mut invalid = Vec::new();
    for entry in entries {
        match entry.validated() {
            Ok(source) => valid.push(source),
            Err(e) => invalid.push(e),
        }
    }

    Ok((valid, invalid))
}

/// Write `records` as one JSON array, replacing `path` atomically.
///
/// The array goes to a temporary file next to `path` first, so readers never see a
/// partially written file.
pub fn write_records(path: &Path, records: &[VideoMetadataRecord]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut file, records).context("Failed to serialize records")?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    // Temp files are created 0600; the output is meant to be shared.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }
    file.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

/// Cancel `token` on Ctrl+C or SIGTERM.
///
/// Work already published stays published; in-flight sources stop at their next
/// tool invocation.
pub async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
        _ = token.cancelled() => return,
    }

    tracing::warn!("Cancelling remaining work...");
    token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rendition_core::{ProbedMedia, RenditionSize, ThumbnailEntry, ThumbnailSet, VideoDetails};

    fn record(name: &str) -> VideoMetadataRecord {
        let probed = ProbedMedia::new(12.5, 1080, 1920, Some(4698.624)).unwrap();
        let mut thumbnails = ThumbnailSet::with_sizes(&RenditionSize::ALL);
        thumbnails.push(ThumbnailEntry {
            size: RenditionSize::Small,
            url: format!("https://cdn.example.com/thumbnails/{}/small/thumbnail_0.jpg", name),
            offset_seconds: 0,
        });
        VideoMetadataRecord::completed(
            format!("https://cdn.example.com/videos/{}.mp4", name),
            VideoDetails::from_probe(&probed, 4698.624, "H.264"),
            thumbnails,
            Vec::new(),
        )
    }

    #[test]
    fn load_sources_splits_valid_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(
            &path,
            r#"[
                {"url": "https://videos.example.com/a.mp4", "width": 1080, "height": 1920, "bitrate": 4698.624},
                {"url": "not a url", "width": 1080, "height": 1920, "bitrate": 1000},
                {"url": "https://videos.example.com/b.dash", "width": 1920, "height": 1080, "bitrate": 2500}
            ]"#,
        )
        .unwrap();

        let (valid, invalid) = load_sources(&path).unwrap();

        assert_eq!(valid.len(), 2);
        assert_eq!(valid[1].url, "https://videos.example.com/b.dash");
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].url, "not a url");
    }

    #[test]
    fn load_sources_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(&path, r#"{"url": "https://videos.example.com/a.mp4"}"#).unwrap();

        assert!(load_sources(&path).is_err());
    }

    #[test]
    fn write_records_replaces_file_with_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs").join("response.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale").unwrap();

        write_records(&path, &[record("first"), record("second")]).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let array = written.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["video_url"], "https://cdn.example.com/videos/first.mp4");
        assert_eq!(array[1]["metadata"]["duration"], 12_500);

        // Only the output itself is left behind
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn write_records_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("response.json");

        write_records(&path, &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[cfg(unix)]
    #[test]
    fn write_records_output_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.json");

        write_records(&path, &[record("first")]).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[tokio::test]
    async fn shutdown_signal_returns_when_token_cancelled_elsewhere() {
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), shutdown_signal(token))
            .await
            .unwrap();
    }
}
