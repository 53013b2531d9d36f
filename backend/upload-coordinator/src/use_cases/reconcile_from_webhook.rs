//! `reconcile-from-webhook`: the object-store completion event's
//! counterpart to `complete-upload`. Looks the video up by its storage key
//! rather than its id (the event only carries `{bucket, key}`), stamps any
//! parts the client never explicitly reported, and funnels into the same
//! Reconcile idempotent receiver — safe to run concurrently with the HTTP
//! completion path.

use crate::error::{AppError, Result};
use crate::services::reconcile::{self, ReconcileOutcome};
use crate::state::AppState;

pub async fn reconcile_from_webhook(
    state: &AppState,
    bucket: &str,
    key: &str,
) -> Result<ReconcileOutcome> {
    let object_key = format!("{bucket}/{key}");
    let mut video = state
        .repository
        .find_by_object_key(&object_key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no video for object key {object_key}")))?;

    if video.status == video_core::VideoStatus::Created || video.status == video_core::VideoStatus::Uploading {
        video.reconcile_all_parts_as_uploaded();
    }

    reconcile::reconcile(state.repository.as_ref(), state.event_bus.as_ref(), video, None, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Config, DatabaseConfig, ObjectStoreSection, QueueConfig};
    use event_bus::InMemoryEventBus;
    use object_store::InMemoryObjectStore;
    use std::sync::Arc;
    use video_core::{Video, VideoMetadata, VideoStatus, VideoStorage};
    use video_repository::InMemoryVideoRepository;

    fn test_state() -> AppState {
        AppState {
            repository: Arc::new(InMemoryVideoRepository::new()),
            object_store: Arc::new(InMemoryObjectStore::new()),
            event_bus: Arc::new(InMemoryEventBus::new()),
            config: Arc::new(Config {
                app: AppConfig {
                    host: "0.0.0.0".to_string(),
                    port: 8080,
                    env: "test".to_string(),
                },
                database: DatabaseConfig {
                    url: "postgres://localhost/test".to_string(),
                },
                object_store: ObjectStoreSection {
                    bucket: "video-pipeline".to_string(),
                    region: "us-east-1".to_string(),
                    internal_endpoint: None,
                    public_endpoint: None,
                },
                queue: QueueConfig {
                    event_bus_name: "video-pipeline".to_string(),
                    complete_multipart_queue_url: String::new(),
                },
            }),
        }
    }

    fn sample_video() -> Video {
        let mut video = Video::new(
            uuid::Uuid::new_v4(),
            uuid::Uuid::new_v4(),
            VideoMetadata {
                total_size_bytes: 100,
                duration_ms: 60_000,
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
        );
        video.start_uploading_if_needed().unwrap();
        video
    }

    #[tokio::test]
    async fn stamps_unreported_parts_and_completes() {
        let state = test_state();
        let video = sample_video();
        state.repository.create_video(&video).await.unwrap();

        let outcome = reconcile_from_webhook(&state, "bucket", "video/x/file/clip.mp4").await.unwrap();
        assert!(!outcome.skipped);
        assert_eq!(outcome.status, VideoStatus::Uploaded);
    }

    #[tokio::test]
    async fn already_completed_is_skipped_without_error() {
        let state = test_state();
        let mut video = sample_video();
        video.reconcile_all_parts_as_uploaded();
        video.complete_upload().unwrap();
        state.repository.create_video(&video).await.unwrap();

        let outcome = reconcile_from_webhook(&state, "bucket", "video/x/file/clip.mp4").await.unwrap();
        assert!(outcome.skipped);
    }

    #[tokio::test]
    async fn unknown_object_key_is_not_found() {
        let state = test_state();
        let err = reconcile_from_webhook(&state, "bucket", "video/missing/file/x.mp4").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
