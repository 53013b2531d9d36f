//! Consumes `Video Status Changed` events with `status=SPLITTING`, extracts
//! frames from each segment, uploads them, and publishes `COMPLETED` (or
//! `FAILED` on any segment failure).

use crate::error::FrameWorkerError;
use crate::extractor::FrameExtractor;
use crate::object_transfer::ObjectTransfer;
use crate::time_range::{self, TimeRange};
use async_trait::async_trait;
use event_bus::EventBusAdapter;
use message_envelope::{MessageMetadata, VideoEventStatus, VideoStatusChangedEvent};
use queue_runtime::{HandlerError, MessageHandler};
use std::sync::Arc;
use tracing::{info, warn};
use worker_support::ScopedWorkspace;

const RUNTIME_TAG: &str = "frame-worker";

pub struct FrameHandler {
    operations: Arc<dyn ObjectTransfer>,
    event_bus: Arc<dyn EventBusAdapter>,
    extractor: Arc<dyn FrameExtractor>,
    segments_bucket: String,
    output_bucket: String,
    public_endpoint: Option<String>,
    segment_duration_secs: u32,
    frame_interval_secs: u32,
}

impl FrameHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        operations: Arc<dyn ObjectTransfer>,
        event_bus: Arc<dyn EventBusAdapter>,
        extractor: Arc<dyn FrameExtractor>,
        segments_bucket: String,
        output_bucket: String,
        public_endpoint: Option<String>,
        segment_duration_secs: u32,
        frame_interval_secs: u32,
    ) -> Self {
        Self {
            operations,
            event_bus,
            extractor,
            segments_bucket,
            output_bucket,
            public_endpoint,
            segment_duration_secs,
            frame_interval_secs,
        }
    }

    async fn process_segment(
        &self,
        video_id: uuid::Uuid,
        workspace: &ScopedWorkspace,
        range: TimeRange,
    ) -> Result<usize, FrameWorkerError> {
        let segment_name = format!("segment_{:04}.mp4", range.segment_index + 1);
        let segment_key = video_core::storage_path::video_part(&self.segments_bucket, video_id, &segment_name);
        let local_segment = workspace.join(&segment_name);

        self.operations.download_to_file(&segment_key, &local_segment).await?;

        let frames = self
            .extractor
            .extract(&local_segment, workspace.path(), range, self.frame_interval_secs)
            .await?;

        for frame_path in &frames {
            let file_name = frame_path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| FrameWorkerError::Extractor("frame path has no file name".into()))?;
            let key = video_core::storage_path::video_print(&self.output_bucket, video_id, file_name);
            self.operations.upload_file(&key, frame_path, "image/jpeg").await?;
        }

        Ok(frames.len())
    }

    async fn process(&self, event: &VideoStatusChangedEvent) -> Result<(), FrameWorkerError> {
        if event.status != VideoEventStatus::Splitting {
            return Err(FrameWorkerError::MalformedEvent(format!(
                "frame-worker only handles SPLITTING, got {:?}",
                event.status
            )));
        }

        let duration_ms = event
            .duration
            .ok_or_else(|| FrameWorkerError::MalformedEvent("event is missing duration".into()))?;

        let ranges = time_range::compute(duration_ms, self.segment_duration_secs * 1000);
        if ranges.is_empty() {
            return Err(FrameWorkerError::MalformedEvent(format!("non-positive duration: {duration_ms}")));
        }

        let workspace = ScopedWorkspace::create(RUNTIME_TAG, event.video_id)
            .await
            .map_err(|e| FrameWorkerError::Extractor(e.to_string()))?;

        let mut total_frames = 0usize;
        for range in ranges {
            total_frames += self.process_segment(event.video_id, &workspace, range).await?;
        }

        info!(video_id = %event.video_id, total_frames, "frame extraction complete, publishing COMPLETED");

        let download_url = format!(
            "{}/{}",
            self.public_endpoint.clone().unwrap_or_default(),
            video_core::storage_path::video_print(&self.output_bucket, event.video_id, "")
        );

        let mut completed =
            VideoStatusChangedEvent::new(event.video_id, event.video_path.clone(), VideoEventStatus::Completed);
        completed.correlation_id = event.correlation_id.clone();
        completed.trace_id = event.trace_id.clone();
        completed.video_name = event.video_name.clone();
        completed.duration = event.duration;
        completed.download_url = Some(download_url);
        self.event_bus.publish(completed).await?;

        Ok(())
    }

    async fn publish_failed(&self, event: &VideoStatusChangedEvent, reason: String) {
        let mut failed = VideoStatusChangedEvent::new(event.video_id, event.video_path.clone(), VideoEventStatus::Failed);
        failed.correlation_id = event.correlation_id.clone();
        failed.trace_id = event.trace_id.clone();
        failed.error_reason = Some(reason);
        if let Err(e) = self.event_bus.publish(failed).await {
            warn!(video_id = %event.video_id, error = %e, "failed to publish FAILED event");
        }
    }
}

#[async_trait]
impl MessageHandler<VideoStatusChangedEvent> for FrameHandler {
    async fn handle(&self, payload: VideoStatusChangedEvent, _metadata: &MessageMetadata) -> Result<(), HandlerError> {
        match self.process(&payload).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let handler_error = err.into_handler_error();
                if !handler_error.is_retryable() {
                    self.publish_failed(&payload, handler_error.to_string()).await;
                }
                Err(handler_error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::FakeFrameExtractor;
    use crate::object_transfer::FakeObjectTransfer;
    use event_bus::InMemoryEventBus;
    use uuid::Uuid;

    fn metadata() -> MessageMetadata {
        MessageMetadata::new("test", "VideoStatusChanged")
    }

    fn splitting_event(video_id: Uuid, duration_ms: i64) -> VideoStatusChangedEvent {
        let mut event = VideoStatusChangedEvent::new(
            video_id,
            format!("in-bucket/video/{video_id}/file/clip.mp4"),
            VideoEventStatus::Splitting,
        );
        event.duration = Some(duration_ms);
        event
    }

    #[tokio::test]
    async fn extracts_frames_for_every_segment_and_publishes_completed() {
        let event_bus = Arc::new(InMemoryEventBus::new());
        let transfer = Arc::new(FakeObjectTransfer::new());
        let handler = FrameHandler::new(
            transfer.clone(),
            event_bus.clone(),
            Arc::new(FakeFrameExtractor { frames_per_segment: 10 }),
            "out-bucket".to_string(),
            "out-bucket".to_string(),
            Some("https://cdn.example.com".to_string()),
            10,
            1,
        );

        let video_id = Uuid::new_v4();
        let event = splitting_event(video_id, 25_000);
        handler.handle(event, &metadata()).await.unwrap();

        // 3 segments (10s, 10s, 5s) x 10 fake frames each.
        assert_eq!(transfer.uploaded_keys().len(), 30);
        let published = event_bus.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].status, VideoEventStatus::Completed);
        assert!(published[0].download_url.is_some());
    }

    #[tokio::test]
    async fn rejects_events_with_the_wrong_status() {
        let event_bus = Arc::new(InMemoryEventBus::new());
        let handler = FrameHandler::new(
            Arc::new(FakeObjectTransfer::new()),
            event_bus.clone(),
            Arc::new(FakeFrameExtractor { frames_per_segment: 1 }),
            "out-bucket".to_string(),
            "out-bucket".to_string(),
            None,
            10,
            1,
        );

        let event = VideoStatusChangedEvent::new(Uuid::new_v4(), "bucket/video/x/file/a.mp4", VideoEventStatus::Uploaded);
        let result = handler.handle(event, &metadata()).await;
        assert!(matches!(result, Err(HandlerError::NonRetryable(_))));
    }

    #[tokio::test]
    async fn a_missing_segment_publishes_failed_with_an_error_reason() {
        let event_bus = Arc::new(InMemoryEventBus::new());
        let video_id = Uuid::new_v4();
        let segment_key = video_core::storage_path::video_part("out-bucket", video_id, "segment_0001.mp4");
        let mut transfer = FakeObjectTransfer::new();
        transfer.missing_segments.insert(segment_key);
        let transfer = Arc::new(transfer);

        let handler = FrameHandler::new(
            transfer,
            event_bus.clone(),
            Arc::new(FakeFrameExtractor { frames_per_segment: 1 }),
            "out-bucket".to_string(),
            "out-bucket".to_string(),
            None,
            10,
            1,
        );

        let event = splitting_event(video_id, 10_000);
        let result = handler.handle(event, &metadata()).await;
        assert!(matches!(result, Err(HandlerError::NonRetryable(_))));

        let published = event_bus.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].status, VideoEventStatus::Failed);
        assert!(published[0].error_reason.is_some());
    }
}
