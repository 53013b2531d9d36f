//! Scoped per-video temp workspace: a directory under `/tmp/{runtimeTag}/{videoId}`
//! that a worker owns exclusively for the lifetime of one handler invocation,
//! guaranteed removed on every exit path (success, handler error, cancellation).

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// RAII guard around a freshly created scoped directory. Dropping it removes
/// the directory tree; this runs even when the handler future is cancelled
/// mid-await, since cancellation drops the guard rather than skipping past it.
pub struct ScopedWorkspace {
    path: PathBuf,
}

impl ScopedWorkspace {
    /// Creates `/tmp/{runtime_tag}/{video_id}`, failing if it cannot be created.
    pub async fn create(runtime_tag: &str, video_id: Uuid) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(runtime_tag).join(video_id.to_string());
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for ScopedWorkspace {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to clean up scoped workspace");
            }
        }
    }
}
