//! Extracts still frames from a segment file at a configured sampling rate.

use crate::error::FrameWorkerError;
use crate::time_range::TimeRange;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Produces `frame_{segment:04}_{index:04}.jpg` files under `workspace`,
    /// one every `frame_interval_secs` across `range`'s duration.
    async fn extract(
        &self,
        segment: &Path,
        workspace: &Path,
        range: TimeRange,
        frame_interval_secs: u32,
    ) -> Result<Vec<PathBuf>, FrameWorkerError>;
}

/// Invokes the external media tool as a subprocess. The tool contract is out
/// of scope; this assumes a binary on `PATH` that accepts `-i <segment> -vf
/// fps=1/<interval> <workspace>/frame_<segment>_%04d.jpg`.
pub struct SubprocessFrameExtractor {
    binary: String,
    timeout: Duration,
}

impl SubprocessFrameExtractor {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl FrameExtractor for SubprocessFrameExtractor {
    async fn extract(
        &self,
        segment: &Path,
        workspace: &Path,
        range: TimeRange,
        frame_interval_secs: u32,
    ) -> Result<Vec<PathBuf>, FrameWorkerError> {
        let prefix = format!("frame_{:04}_", range.segment_index + 1);
        let pattern = workspace.join(format!("{prefix}%04d.jpg"));
        let fps = format!("fps=1/{}", frame_interval_secs.max(1));

        let args = [
            "-i",
            segment.to_str().ok_or_else(|| FrameWorkerError::Extractor("non-utf8 segment path".into()))?,
            "-vf",
            &fps,
            pattern
                .to_str()
                .ok_or_else(|| FrameWorkerError::Extractor("non-utf8 workspace path".into()))?,
        ];

        worker_support::run_media_tool(&self.binary, &args, self.timeout)
            .await
            .map_err(|e| FrameWorkerError::Extractor(e.to_string()))?;

        list_frames(workspace, &prefix).await
    }
}

async fn list_frames(workspace: &Path, prefix: &str) -> Result<Vec<PathBuf>, FrameWorkerError> {
    let mut entries = tokio::fs::read_dir(workspace)
        .await
        .map_err(|e| FrameWorkerError::Extractor(e.to_string()))?;

    let mut frames = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FrameWorkerError::Extractor(e.to_string()))?
    {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(prefix) && name.ends_with(".jpg") {
            frames.push(entry.path());
        }
    }
    frames.sort();
    Ok(frames)
}

#[cfg(test)]
pub struct FakeFrameExtractor {
    pub frames_per_segment: usize,
}

#[cfg(test)]
#[async_trait]
impl FrameExtractor for FakeFrameExtractor {
    async fn extract(
        &self,
        _segment: &Path,
        workspace: &Path,
        range: TimeRange,
        _frame_interval_secs: u32,
    ) -> Result<Vec<PathBuf>, FrameWorkerError> {
        let mut paths = Vec::new();
        for i in 1..=self.frames_per_segment {
            let path = workspace.join(format!("frame_{:04}_{:04}.jpg", range.segment_index + 1, i));
            tokio::fs::write(&path, b"fake-frame").await.unwrap();
            paths.push(path);
        }
        Ok(paths)
    }
}
