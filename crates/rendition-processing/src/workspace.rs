//! Per-source scratch directories.
//!
//! Every source gets its own `rendition-*` directory under the work root, so
//! concurrent or crashed runs never see each other's files. The directory is
//! removed when the `RunWorkspace` is dropped, whether the run succeeded or not.
//!
//! Each workspace carries an owner marker with the PID of the process that created
//! it. Only workspaces whose owner is gone are ever swept.

use rendition_core::constants::{WORKSPACE_DIR_PREFIX, WORKSPACE_OWNER_FILE};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SOURCE_FILE_NAME: &str = "source.mp4";
const THUMBNAILS_DIR: &str = "thumbnails";
const PREVIEWS_DIR: &str = "previews";

pub struct RunWorkspace {
    dir: TempDir,
}

impl RunWorkspace {
    /// Create a fresh, empty workspace under `work_root`.
    pub async fn create(work_root: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(work_root).await?;

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_DIR_PREFIX)
            .tempdir_in(work_root)?;

        tokio::fs::create_dir_all(dir.path().join(THUMBNAILS_DIR)).await?;
        tokio::fs::create_dir_all(dir.path().join(PREVIEWS_DIR)).await?;
        tokio::fs::write(
            dir.path().join(WORKSPACE_OWNER_FILE),
            std::process::id().to_string(),
        )
        .await?;

        tracing::debug!(path = %dir.path().display(), "Workspace created");

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the downloaded source is written.
    pub fn source_path(&self) -> PathBuf {
        self.dir.path().join(SOURCE_FILE_NAME)
    }

    pub fn thumbnails_dir(&self) -> PathBuf {
        self.dir.path().join(THUMBNAILS_DIR)
    }

    pub fn previews_dir(&self) -> PathBuf {
        self.dir.path().join(PREVIEWS_DIR)
    }
}

/// Remove workspaces left behind by processes that no longer exist.
///
/// A `rendition-*` directory is removed only when its owner marker names a dead
/// process. Directories without a readable marker are not ours and stay; so do the
/// live workspaces of this and any other running process.
pub async fn sweep_stale(work_root: &Path) -> io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(work_root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let is_workspace = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(WORKSPACE_DIR_PREFIX));
        if !is_workspace || !entry.file_type().await?.is_dir() {
            continue;
        }

        let Some(owner) = read_owner(&entry.path()).await else {
            tracing::debug!(path = %entry.path().display(), "No owner marker, leaving directory alone");
            continue;
        };
        if process_alive(owner) {
            continue;
        }

        match tokio::fs::remove_dir_all(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(
                error = %e,
                path = %entry.path().display(),
                owner_pid = owner,
                "Failed to remove stale workspace"
            ),
        }
    }

    if removed > 0 {
        tracing::info!(removed = removed, work_root = %work_root.display(), "Removed stale workspaces");
    }

    Ok(removed)
}

async fn read_owner(workspace: &Path) -> Option<u32> {
    let raw = tokio::fs::read_to_string(workspace.join(WORKSPACE_OWNER_FILE))
        .await
        .ok()?;
    raw.trim().parse().ok()
}

/// A recycled PID reads as alive, which only keeps a stale directory around.
#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    // Signal 0 only checks that the process exists. EPERM means it exists under
    // another user.
    !matches!(kill(Pid::from_raw(raw), None), Err(Errno::ESRCH))
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}
