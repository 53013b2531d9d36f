//! Idempotent-receiver wrapper: the single path through which a video is
//! ever moved to `UPLOADED`, whether driven by the HTTP complete-upload
//! route or the object-store completion webhook.

use crate::error::{AppError, Result};
use correlation_context::CorrelationContext;
use event_bus::EventBusAdapter;
use message_envelope::{VideoEventStatus, VideoStatusChangedEvent};
use uuid::Uuid;
use video_core::{Video, VideoStatus};
use video_repository::{UpdateOutcome, VideoRepository};

pub struct ReconcileOutcome {
    pub status: VideoStatus,
    pub skipped: bool,
}

/// Transitions `video` to `UPLOADED` exactly once, tolerating concurrent
/// callers (the HTTP path and the webhook path) racing on the same video.
pub async fn reconcile(
    repository: &dyn VideoRepository,
    event_bus: &dyn EventBusAdapter,
    mut video: Video,
    correlation_id: Option<String>,
    trace_id: Option<String>,
) -> Result<ReconcileOutcome> {
    if video.status != VideoStatus::Created && video.status != VideoStatus::Uploading {
        return Ok(ReconcileOutcome {
            status: video.status,
            skipped: true,
        });
    }

    let expected_status = video.status;
    video.start_uploading_if_needed()?;
    video.complete_upload()?;

    let outcome = repository.update_video(&video, expected_status).await?;
    match outcome {
        UpdateOutcome::StaleUpdate => Ok(ReconcileOutcome {
            status: VideoStatus::Uploaded,
            skipped: true,
        }),
        UpdateOutcome::Applied => {
            publish_uploaded_event(event_bus, &video, correlation_id, trace_id).await?;
            Ok(ReconcileOutcome {
                status: VideoStatus::Uploaded,
                skipped: false,
            })
        }
    }
}

async fn publish_uploaded_event(
    event_bus: &dyn EventBusAdapter,
    video: &Video,
    correlation_id: Option<String>,
    trace_id: Option<String>,
) -> Result<()> {
    let ambient = correlation_context::current();
    let correlation_id = ambient
        .as_ref()
        .map(|c| c.correlation_id.clone())
        .or(correlation_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let trace_id = ambient
        .map(|c| c.trace_id)
        .or(trace_id)
        .unwrap_or_else(|| CorrelationContext::generate().trace_id);

    let mut event = VideoStatusChangedEvent::new(
        video.id,
        video.storage.object_key.clone(),
        VideoEventStatus::Uploaded,
    );
    event.correlation_id = correlation_id;
    event.trace_id = trace_id;
    event.video_name = Some(video.metadata.filename.clone());
    event.duration = Some(video.metadata.duration_ms);

    event_bus
        .publish(event)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::InMemoryEventBus;
    use video_core::{VideoMetadata, VideoStorage};
    use video_repository::InMemoryVideoRepository;

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
        video.assign_url_to_part(1, "u1".into()).unwrap();
        video.mark_part_as_uploaded(1, "e1".into()).unwrap();
        video.assign_url_to_part(2, "u2".into()).unwrap();
        video.mark_part_as_uploaded(2, "e2".into()).unwrap();
        video
    }

    #[tokio::test]
    async fn concurrent_reconcile_publishes_exactly_one_event() {
        let repository = InMemoryVideoRepository::new();
        let event_bus = InMemoryEventBus::new();
        let video = sample_video();
        repository.create_video(&video).await.unwrap();

        let (a, b) = tokio::join!(
            reconcile(&repository, &event_bus, video.clone(), None, None),
            reconcile(&repository, &event_bus, video.clone(), None, None),
        );

        assert!(a.is_ok());
        assert!(b.is_ok());
        let skipped_count = [a.unwrap().skipped, b.unwrap().skipped]
            .into_iter()
            .filter(|s| *s)
            .count();
        assert_eq!(skipped_count, 1, "exactly one of the two racing callers should win");
        assert_eq!(event_bus.published().len(), 1);
    }

    #[tokio::test]
    async fn already_uploaded_video_is_skipped_without_publishing() {
        let repository = InMemoryVideoRepository::new();
        let event_bus = InMemoryEventBus::new();
        let mut video = sample_video();
        video.start_uploading_if_needed().unwrap();
        video.complete_upload().unwrap();
        repository.create_video(&video).await.unwrap();

        let outcome = reconcile(&repository, &event_bus, video, None, None).await.unwrap();
        assert!(outcome.skipped);
        assert!(event_bus.published().is_empty());
    }
}
