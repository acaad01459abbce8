use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure to persist an upload into the scratch directory. Kept separate
/// from classification failures so callers can tell the two apart.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to create scratch directory {dir:?}: {source}")]
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write scratch file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Scratch-directory store for per-request upload files.
///
/// The root is passed in at construction, so tests can point each instance
/// at an isolated temporary directory. The directory itself is created
/// lazily on first acquire and never torn down.
pub struct ScratchStore {
    root: PathBuf,
}

impl ScratchStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `content` under a per-request unique name and returns a guard
    /// that removes the file when dropped.
    pub async fn acquire(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<ScratchFile, StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::CreateDir {
                dir: self.root.clone(),
                source,
            })?;

        let path = self.root.join(unique_name(filename));
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        debug!("Stored upload at {}", path.display());
        Ok(ScratchFile { path })
    }
}

/// Per-request unique name: nanosecond timestamp plus the client-supplied
/// filename, or the timestamp alone when no usable filename was given.
/// Two requests hitting the same nanosecond with the same filename would
/// collide; that residual race is accepted and not guarded further.
fn unique_name(filename: &str) -> String {
    let ts = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    if filename.is_empty() {
        ts.to_string()
    } else {
        format!("{ts}_{filename}")
    }
}

/// Owning handle to one stored upload. The file is removed on drop, which
/// runs on every exit path of the request that acquired it. A failed
/// removal is logged and never surfaced.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(
                "Could not remove scratch file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
