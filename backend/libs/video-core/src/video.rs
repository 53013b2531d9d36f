//! The Video aggregate root.

use crate::constants::{ALLOWED_EXTENSIONS, DEFAULT_BATCH_SIZE};
use crate::error::VideoCoreError;
use crate::part::{PartStatus, VideoPart};
use crate::status::VideoStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub total_size_bytes: i64,
    pub duration_ms: i64,
    pub filename: String,
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStorage {
    pub upload_id: String,
    pub object_key: String,
    pub bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub metadata: VideoMetadata,
    pub status: VideoStatus,
    pub storage: VideoStorage,
    pub parts: Vec<VideoPart>,
    /// Total parts in the plan, which may exceed `parts.len()` until
    /// `ensure_parts_materialized_through` catches the tail up.
    pub total_parts_planned: u32,
    pub part_size_bytes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Progress snapshot returned by [`Video::upload_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub total_parts: u32,
    pub uploaded_parts: u32,
    pub percentage: f64,
}

/// One page of presigned-URL work: the parts to assign URLs to plus the
/// cursor for the next page (`None` once every part has a URL).
#[derive(Debug, Clone)]
pub struct PendingPartsBatch {
    pub batch: Vec<u32>,
    pub next_part_number: Option<u32>,
}

pub fn validate_extension(extension: &str) -> bool {
    let normalized = extension.trim_start_matches('.').to_lowercase();
    ALLOWED_EXTENSIONS.contains(&normalized.as_str())
}

impl Video {
    /// Materialises every part of the plan up front. For plans larger than
    /// [`crate::constants::MATERIALIZED_PART_CAP`], use
    /// [`Video::with_materialized_parts`] instead.
    pub fn new(
        id: Uuid,
        user_id: Uuid,
        metadata: VideoMetadata,
        storage: VideoStorage,
        number_of_parts: u32,
        part_size: i64,
    ) -> Self {
        Self::with_materialized_parts(id, user_id, metadata, storage, number_of_parts, part_size, number_of_parts)
    }

    /// Materialises only the first `materialized_parts` parts of a
    /// `number_of_parts` plan. The true final part of the whole plan carries
    /// the remainder-sized tail; it's only given that size here if it falls
    /// within the materialised prefix, so capping never mis-sizes a part
    /// that the plan meant to be a full `part_size` chunk.
    pub fn with_materialized_parts(
        id: Uuid,
        user_id: Uuid,
        metadata: VideoMetadata,
        storage: VideoStorage,
        number_of_parts: u32,
        part_size: i64,
        materialized_parts: u32,
    ) -> Self {
        let now = Utc::now();
        let total = metadata.total_size_bytes;
        let materialized_parts = materialized_parts.min(number_of_parts);
        let parts = (1..=materialized_parts)
            .map(|n| {
                let size = if n == number_of_parts {
                    total - part_size * (number_of_parts as i64 - 1)
                } else {
                    part_size
                };
                VideoPart::new(n, size)
            })
            .collect();

        Self {
            id,
            user_id,
            metadata,
            status: VideoStatus::Created,
            storage,
            parts,
            total_parts_planned: number_of_parts,
            part_size_bytes: part_size,
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends parts `parts.len()+1 ..= total_parts_planned.min(target)`,
    /// sizing each the same way the original plan would have. A no-op once
    /// every planned part is already materialised.
    pub fn ensure_parts_materialized_through(&mut self, target: u32) {
        let target = target.min(self.total_parts_planned);
        let next = self.parts.len() as u32 + 1;
        if next > target {
            return;
        }
        let total = self.metadata.total_size_bytes;
        let part_size = self.part_size_bytes;
        let number_of_parts = self.total_parts_planned;
        for n in next..=target {
            let size = if n == number_of_parts {
                total - part_size * (number_of_parts as i64 - 1)
            } else {
                part_size
            };
            self.parts.push(VideoPart::new(n, size));
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn transition(&mut self, target: VideoStatus) -> Result<(), VideoCoreError> {
        if self.status == target {
            return Ok(());
        }
        if !self.status.can_transition_to(target) {
            return Err(VideoCoreError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }
        self.status = target;
        self.touch();
        Ok(())
    }

    pub fn add_part(&mut self, part: VideoPart) {
        self.parts.push(part);
        self.touch();
    }

    pub fn assign_url_to_part(&mut self, part_number: u32, url: String) -> Result<(), VideoCoreError> {
        if self.status.is_terminal() {
            return Err(VideoCoreError::TerminalState(self.status.as_str().to_string()));
        }
        let part = self
            .parts
            .iter_mut()
            .find(|p| p.part_number == part_number)
            .ok_or(VideoCoreError::PartNotFound(part_number))?;
        part.url = url;
        part.status = PartStatus::Uploading;
        self.touch();
        Ok(())
    }

    /// Idempotent: re-marking with the same etag is a no-op; a different
    /// etag overwrites (the client retried the PUT and got a new etag).
    pub fn mark_part_as_uploaded(&mut self, part_number: u32, etag: String) -> Result<(), VideoCoreError> {
        let part = self
            .parts
            .iter_mut()
            .find(|p| p.part_number == part_number)
            .ok_or(VideoCoreError::PartNotFound(part_number))?;
        if part.etag == etag && matches!(part.status, PartStatus::Uploaded) {
            return Ok(());
        }
        part.etag = etag;
        part.status = PartStatus::Uploaded;
        self.touch();
        Ok(())
    }

    /// Parts with no URL yet, ordered by part number, paged by `batch_size`.
    /// Once every materialised part has a URL, `next_part_number` still
    /// points past the materialised tail if the plan has more parts queued
    /// up — the caller materialises them with
    /// `ensure_parts_materialized_through` before presigning the next page.
    pub fn pending_parts_batch(&self, batch_size: usize) -> PendingPartsBatch {
        let mut pending: Vec<&VideoPart> = self.parts.iter().filter(|p| !p.has_url()).collect();
        pending.sort_by_key(|p| p.part_number);

        let batch: Vec<u32> = pending.iter().take(batch_size).map(|p| p.part_number).collect();
        let next_part_number = pending
            .get(batch.len())
            .map(|p| p.part_number)
            .or_else(|| {
                let materialized = self.parts.len() as u32;
                (materialized < self.total_parts_planned).then_some(materialized + 1)
            });

        PendingPartsBatch { batch, next_part_number }
    }

    pub fn pending_parts_default_batch(&self) -> PendingPartsBatch {
        self.pending_parts_batch(DEFAULT_BATCH_SIZE)
    }

    pub fn upload_progress(&self) -> UploadProgress {
        let total_parts = self.parts.len() as u32;
        let uploaded_parts = self.parts.iter().filter(|p| p.is_uploaded()).count() as u32;
        let percentage = if total_parts == 0 {
            0.0
        } else {
            (uploaded_parts as f64 / total_parts as f64) * 100.0
        };
        UploadProgress {
            total_parts,
            uploaded_parts,
            percentage,
        }
    }

    pub fn is_fully_uploaded(&self) -> bool {
        !self.parts.is_empty() && self.parts.iter().all(|p| p.is_uploaded())
    }

    pub fn uploaded_parts_etags(&self) -> Vec<(u32, String)> {
        let mut etags: Vec<(u32, String)> = self
            .parts
            .iter()
            .filter(|p| p.is_uploaded())
            .map(|p| (p.part_number, p.etag.clone()))
            .collect();
        etags.sort_by_key(|(n, _)| *n);
        etags
    }

    pub fn can_generate_more_urls(&self) -> bool {
        matches!(self.status, VideoStatus::Created | VideoStatus::Uploading)
    }

    /// No-op success from `UPLOADING`; transitions from `CREATED`; fails otherwise.
    pub fn start_uploading_if_needed(&mut self) -> Result<(), VideoCoreError> {
        match self.status {
            VideoStatus::Uploading => Ok(()),
            VideoStatus::Created => self.transition(VideoStatus::Uploading),
            _ => Err(VideoCoreError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: VideoStatus::Uploading.as_str().to_string(),
            }),
        }
    }

    pub fn complete_upload(&mut self) -> Result<(), VideoCoreError> {
        if !self.is_fully_uploaded() {
            return Err(VideoCoreError::IncompleteUpload {
                uploaded: self.upload_progress().uploaded_parts,
                total: self.upload_progress().total_parts,
            });
        }
        self.transition(VideoStatus::Uploaded)
    }

    /// Webhook path: mark every part uploaded, stamping a synthetic etag
    /// for any part the client never explicitly reported.
    pub fn reconcile_all_parts_as_uploaded(&mut self) {
        for part in &mut self.parts {
            if part.etag.is_empty() {
                part.etag = format!("reconciled-{}", part.part_number);
            }
            part.status = PartStatus::Uploaded;
        }
        self.touch();
    }

    pub fn mark_splitting(&mut self) -> Result<(), VideoCoreError> {
        self.transition(VideoStatus::Splitting)
    }

    pub fn mark_printing(&mut self) -> Result<(), VideoCoreError> {
        self.transition(VideoStatus::Printing)
    }

    pub fn mark_completed(&mut self) -> Result<(), VideoCoreError> {
        self.transition(VideoStatus::Completed)
    }

    pub fn mark_failed(&mut self) -> Result<(), VideoCoreError> {
        self.transition(VideoStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video(total_size: i64, parts: u32, part_size: i64) -> Video {
        Video::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            VideoMetadata {
                total_size_bytes: total_size,
                duration_ms: 60_000,
                filename: "clip.mp4".to_string(),
                extension: "mp4".to_string(),
            },
            VideoStorage {
                upload_id: "upload-1".to_string(),
                object_key: "bucket/video/x/file/clip.mp4".to_string(),
                bucket: "bucket".to_string(),
            },
            parts,
            part_size,
        )
    }

    #[test]
    fn validates_extensions_case_insensitively() {
        assert!(validate_extension("MP4"));
        assert!(validate_extension(".mov"));
        assert!(!validate_extension("exe"));
    }

    #[test]
    fn report_part_uploaded_is_idempotent() {
        let mut video = sample_video(100, 4, 25);
        video.assign_url_to_part(1, "https://store/p1".to_string()).unwrap();
        video.mark_part_as_uploaded(1, "etag-1".to_string()).unwrap();
        let progress_first = video.upload_progress();

        // Re-reporting the same etag is a no-op.
        video.mark_part_as_uploaded(1, "etag-1".to_string()).unwrap();
        let progress_second = video.upload_progress();

        assert_eq!(progress_first, progress_second);
        assert_eq!(progress_first.uploaded_parts, 1);
    }

    #[test]
    fn complete_upload_requires_full_coverage() {
        let mut video = sample_video(100, 2, 50);
        assert!(video.complete_upload().is_err());

        video.assign_url_to_part(1, "u1".into()).unwrap();
        video.mark_part_as_uploaded(1, "e1".into()).unwrap();
        video.assign_url_to_part(2, "u2".into()).unwrap();
        video.mark_part_as_uploaded(2, "e2".into()).unwrap();

        video.start_uploading_if_needed().unwrap();
        assert!(video.complete_upload().is_ok());
        assert_eq!(video.status, VideoStatus::Uploaded);
    }

    #[test]
    fn pending_batch_pages_through_large_part_counts() {
        let video = sample_video(33 * 32 * 1024 * 1024, 33, 32 * 1024 * 1024);
        let first = video.pending_parts_batch(20);
        assert_eq!(first.batch.len(), 20);
        assert_eq!(first.next_part_number, Some(21));
    }

    #[test]
    fn start_uploading_is_idempotent_no_op() {
        let mut video = sample_video(100, 2, 50);
        video.start_uploading_if_needed().unwrap();
        assert_eq!(video.status, VideoStatus::Uploading);
        // Calling again is a no-op success, not an error.
        video.start_uploading_if_needed().unwrap();
        assert_eq!(video.status, VideoStatus::Uploading);
    }

    #[test]
    fn reconcile_stamps_synthetic_etags() {
        let mut video = sample_video(100, 2, 50);
        video.reconcile_all_parts_as_uploaded();
        assert!(video.is_fully_uploaded());
        assert!(video.parts.iter().all(|p| !p.etag.is_empty()));
    }

    #[test]
    fn cannot_assign_url_once_terminal() {
        let mut video = sample_video(100, 1, 100);
        video.mark_failed().unwrap();
        assert!(video.assign_url_to_part(1, "u".into()).is_err());
    }

    #[test]
    fn materialized_cap_never_assigns_the_remainder_size_to_a_prefix_part() {
        // A 5-part plan of 50 bytes each, capped to 3 materialised parts.
        // Part 5 (index 5) would carry the remainder if it were materialised;
        // since it isn't, none of the first 3 parts should get that size.
        let video = Video::with_materialized_parts(
            Uuid::new_v4(),
            Uuid::new_v4(),
            VideoMetadata {
                total_size_bytes: 250,
                duration_ms: 60_000,
                filename: "clip.mp4".to_string(),
                extension: "mp4".to_string(),
            },
            VideoStorage {
                upload_id: "upload-1".to_string(),
                object_key: "bucket/video/x/file/clip.mp4".to_string(),
                bucket: "bucket".to_string(),
            },
            5,
            50,
            3,
        );

        assert_eq!(video.parts.len(), 3);
        assert!(video.parts.iter().all(|p| p.size_bytes == 50));
    }

    #[test]
    fn materialized_cap_at_the_full_plan_still_sizes_the_last_part_as_remainder() {
        let video = Video::with_materialized_parts(
            Uuid::new_v4(),
            Uuid::new_v4(),
            VideoMetadata {
                total_size_bytes: 230,
                duration_ms: 60_000,
                filename: "clip.mp4".to_string(),
                extension: "mp4".to_string(),
            },
            VideoStorage {
                upload_id: "upload-1".to_string(),
                object_key: "bucket/video/x/file/clip.mp4".to_string(),
                bucket: "bucket".to_string(),
            },
            5,
            50,
            5,
        );

        assert_eq!(video.parts.len(), 5);
        assert_eq!(video.parts[4].size_bytes, 30);
    }
}
