//! `complete-upload`: the HTTP-driven completion path. Calls
//! `completeMultipart` on the object store, then delegates the status
//! transition and event emission to the Reconcile service so it collapses
//! into the same idempotent-receiver path as the webhook.

use crate::error::{AppError, Result};
use crate::services::reconcile::{self, ReconcileOutcome};
use crate::state::AppState;
use object_store::{CompletedUpload, PartETag};
use uuid::Uuid;
use video_core::VideoStatus;

pub async fn complete_upload(
    state: &AppState,
    video_id: Uuid,
    correlation_id: Option<String>,
    trace_id: Option<String>,
) -> Result<(ReconcileOutcome, CompletedUpload)> {
    let video = state
        .repository
        .find_by_id(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video {video_id} not found")))?;

    if video.status != VideoStatus::Uploading {
        return Err(AppError::PolicyViolation(format!(
            "video {video_id} is in status {:?}, expected UPLOADING",
            video.status
        )));
    }
    if !video.is_fully_uploaded() {
        let progress = video.upload_progress();
        return Err(AppError::PolicyViolation(format!(
            "video {video_id} has only {}/{} parts uploaded",
            progress.uploaded_parts, progress.total_parts
        )));
    }

    let etags: Vec<PartETag> = video
        .uploaded_parts_etags()
        .into_iter()
        .map(|(part_number, etag)| PartETag { part_number, etag })
        .collect();

    let completed = state
        .object_store
        .complete_multipart(&video.storage.object_key, &video.storage.upload_id, &etags)
        .await?;

    let outcome = reconcile::reconcile(
        state.repository.as_ref(),
        state.event_bus.as_ref(),
        video,
        correlation_id,
        trace_id,
    )
    .await?;

    Ok((outcome, completed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Config, DatabaseConfig, ObjectStoreSection, QueueConfig};
    use event_bus::InMemoryEventBus;
    use object_store::InMemoryObjectStore;
    use std::sync::Arc;
    use video_core::{Video, VideoMetadata, VideoStorage};
    use video_repository::InMemoryVideoRepository;

    fn test_state_with_bus() -> (AppState, Arc<InMemoryEventBus>) {
        let event_bus = Arc::new(InMemoryEventBus::new());
        let state = AppState {
            repository: Arc::new(InMemoryVideoRepository::new()),
            object_store: Arc::new(InMemoryObjectStore::new()),
            event_bus: event_bus.clone(),
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
        };
        (state, event_bus)
    }

    fn sample_video() -> Video {
        let mut video = Video::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
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
        video.assign_url_to_part(1, "u1".into()).unwrap();
        video.mark_part_as_uploaded(1, "e1".into()).unwrap();
        video.assign_url_to_part(2, "u2".into()).unwrap();
        video.mark_part_as_uploaded(2, "e2".into()).unwrap();
        video
    }

    #[tokio::test]
    async fn completes_and_publishes_once_fully_uploaded() {
        let (state, event_bus) = test_state_with_bus();
        let video = sample_video();
        state.repository.create_video(&video).await.unwrap();

        let (outcome, completed) = complete_upload(&state, video.id, None, None).await.unwrap();
        assert!(!outcome.skipped);
        assert_eq!(outcome.status, VideoStatus::Uploaded);
        assert_eq!(event_bus.published().len(), 1);
        assert_eq!(completed.etag, "in-memory-etag");
    }

    #[tokio::test]
    async fn rejects_incomplete_uploads() {
        let (state, _event_bus) = test_state_with_bus();
        let mut video = sample_video();
        video.parts[1].status = video_core::PartStatus::Pending;
        video.parts[1].etag = String::new();
        state.repository.create_video(&video).await.unwrap();

        let err = complete_upload(&state, video.id, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::PolicyViolation(_)));
    }
}
