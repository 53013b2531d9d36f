//! Splits a source video into fixed-duration segment files.

use crate::error::SplitWorkerError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[async_trait]
pub trait MediaSegmenter: Send + Sync {
    /// Produces `segment_NNNN.mp4` files of `segment_duration_secs` each under
    /// `workspace`, returning their paths in order.
    async fn segment(
        &self,
        source: &Path,
        workspace: &Path,
        segment_duration_secs: u32,
    ) -> Result<Vec<PathBuf>, SplitWorkerError>;
}

/// Invokes the external media tool as a subprocess. The tool contract is out
/// of scope; this assumes a binary on `PATH` that accepts `-i <source> -f
/// segment -segment_time <secs> <workspace>/segment_%04d.mp4`.
pub struct SubprocessSegmenter {
    binary: String,
    timeout: Duration,
}

impl SubprocessSegmenter {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaSegmenter for SubprocessSegmenter {
    async fn segment(
        &self,
        source: &Path,
        workspace: &Path,
        segment_duration_secs: u32,
    ) -> Result<Vec<PathBuf>, SplitWorkerError> {
        let pattern = workspace.join("segment_%04d.mp4");
        let args = [
            "-i",
            source.to_str().ok_or_else(|| SplitWorkerError::Segmenter("non-utf8 source path".into()))?,
            "-f",
            "segment",
            "-segment_time",
            &segment_duration_secs.to_string(),
            "-reset_timestamps",
            "1",
            pattern
                .to_str()
                .ok_or_else(|| SplitWorkerError::Segmenter("non-utf8 workspace path".into()))?,
        ];

        worker_support::run_media_tool(&self.binary, &args, self.timeout)
            .await
            .map_err(|e| SplitWorkerError::Segmenter(e.to_string()))?;

        list_segments(workspace).await
    }
}

async fn list_segments(workspace: &Path) -> Result<Vec<PathBuf>, SplitWorkerError> {
    let mut entries = tokio::fs::read_dir(workspace)
        .await
        .map_err(|e| SplitWorkerError::Segmenter(e.to_string()))?;

    let mut segments = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SplitWorkerError::Segmenter(e.to_string()))?
    {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("segment_") && name.ends_with(".mp4") {
            segments.push(entry.path());
        }
    }
    segments.sort();
    Ok(segments)
}

#[cfg(test)]
pub struct FakeSegmenter {
    pub segment_count: usize,
}

#[cfg(test)]
#[async_trait]
impl MediaSegmenter for FakeSegmenter {
    async fn segment(
        &self,
        _source: &Path,
        workspace: &Path,
        _segment_duration_secs: u32,
    ) -> Result<Vec<PathBuf>, SplitWorkerError> {
        let mut paths = Vec::new();
        for i in 1..=self.segment_count {
            let path = workspace.join(format!("segment_{:04}.mp4", i));
            tokio::fs::write(&path, b"fake-segment").await.unwrap();
            paths.push(path);
        }
        Ok(paths)
    }
}
