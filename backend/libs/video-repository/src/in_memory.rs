//! In-memory `VideoRepository`, for use-case and reconcile-service tests.

use crate::error::{RepositoryError, UpdateOutcome};
use crate::VideoRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;
use video_core::{Video, VideoStatus};

#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: Mutex<HashMap<Uuid, Video>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(&self, video: &Video) -> Result<(), RepositoryError> {
        self.videos.lock().unwrap().insert(video.id, video.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, RepositoryError> {
        Ok(self.videos.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_object_key(&self, object_key: &str) -> Result<Option<Video>, RepositoryError> {
        Ok(self
            .videos
            .lock()
            .unwrap()
            .values()
            .find(|v| v.storage.object_key == object_key)
            .cloned())
    }

    async fn update_video_part(&self, video: &Video) -> Result<(), RepositoryError> {
        let mut videos = self.videos.lock().unwrap();
        let stored = videos.get_mut(&video.id).ok_or(RepositoryError::NotFound)?;
        stored.metadata = video.metadata.clone();
        stored.storage = video.storage.clone();
        stored.parts = video.parts.clone();
        stored.updated_at = video.updated_at;
        Ok(())
    }

    async fn update_video(
        &self,
        video: &Video,
        expected_status: VideoStatus,
    ) -> Result<UpdateOutcome, RepositoryError> {
        let mut videos = self.videos.lock().unwrap();
        let stored = videos.get_mut(&video.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected_status {
            return Ok(UpdateOutcome::StaleUpdate);
        }
        *stored = video.clone();
        Ok(UpdateOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use video_core::{VideoMetadata, VideoStorage};

    fn sample_video() -> Video {
        Video::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            VideoMetadata {
                total_size_bytes: 100,
                duration_ms: 1000,
                filename: "clip.mp4".to_string(),
                extension: "mp4".to_string(),
            },
            VideoStorage {
                upload_id: "upload-1".to_string(),
                object_key: "bucket/video/x/file/clip.mp4".to_string(),
                bucket: "bucket".to_string(),
            },
            2,
            50,
        )
    }

    #[tokio::test]
    async fn update_video_fails_conditional_check_on_stale_status() {
        let repo = InMemoryVideoRepository::new();
        let video = sample_video();
        repo.create_video(&video).await.unwrap();

        let mut first_writer = video.clone();
        first_writer.start_uploading_if_needed().unwrap();
        let outcome = repo
            .update_video(&first_writer, VideoStatus::Created)
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Applied);

        // A second writer still working off the pre-transition snapshot
        // expects CREATED; the row has already moved to UPLOADING.
        let mut second_writer = video.clone();
        second_writer.start_uploading_if_needed().unwrap();
        let outcome = repo
            .update_video(&second_writer, VideoStatus::Created)
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::StaleUpdate);
    }

    #[tokio::test]
    async fn find_by_object_key_locates_the_video() {
        let repo = InMemoryVideoRepository::new();
        let video = sample_video();
        repo.create_video(&video).await.unwrap();

        let found = repo
            .find_by_object_key(&video.storage.object_key)
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, video.id);
    }
}
