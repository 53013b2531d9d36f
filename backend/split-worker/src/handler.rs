//! Consumes `Video Status Changed` events with `status=UPLOADED`, splits the
//! source video into fixed-duration segments, uploads them, and publishes
//! `SPLITTING`.

use crate::error::SplitWorkerError;
use crate::object_transfer::ObjectTransfer;
use crate::segmenter::MediaSegmenter;
use async_trait::async_trait;
use event_bus::EventBusAdapter;
use message_envelope::{MessageMetadata, VideoEventStatus, VideoStatusChangedEvent};
use queue_runtime::{HandlerError, MessageHandler};
use std::sync::Arc;
use tracing::{info, warn};
use worker_support::ScopedWorkspace;

const RUNTIME_TAG: &str = "split-worker";

pub struct SplitHandler {
    operations: Arc<dyn ObjectTransfer>,
    event_bus: Arc<dyn EventBusAdapter>,
    segmenter: Arc<dyn MediaSegmenter>,
    output_bucket: String,
    segment_duration_secs: u32,
}

impl SplitHandler {
    pub fn new(
        operations: Arc<dyn ObjectTransfer>,
        event_bus: Arc<dyn EventBusAdapter>,
        segmenter: Arc<dyn MediaSegmenter>,
        output_bucket: String,
        segment_duration_secs: u32,
    ) -> Self {
        Self {
            operations,
            event_bus,
            segmenter,
            output_bucket,
            segment_duration_secs,
        }
    }

    async fn process(&self, event: &VideoStatusChangedEvent) -> Result<(), SplitWorkerError> {
        if event.status != VideoEventStatus::Uploaded {
            return Err(SplitWorkerError::MalformedEvent(format!(
                "split-worker only handles UPLOADED, got {:?}",
                event.status
            )));
        }

        let parsed = video_core::storage_path::parse(&event.video_path)
            .ok_or_else(|| SplitWorkerError::MalformedEvent(format!("unparsable video path: {}", event.video_path)))?;

        let workspace = ScopedWorkspace::create(RUNTIME_TAG, event.video_id)
            .await
            .map_err(|e| SplitWorkerError::Segmenter(e.to_string()))?;

        let source_path = workspace.join("source");
        self.operations.download_to_file(&event.video_path, &source_path).await?;

        let segments = self
            .segmenter
            .segment(&source_path, workspace.path(), self.segment_duration_secs)
            .await?;

        if segments.is_empty() {
            return Err(SplitWorkerError::Segmenter("segmenter produced no output".to_string()));
        }

        for segment_path in &segments {
            let file_name = segment_path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| SplitWorkerError::Segmenter("segment path has no file name".into()))?;
            let key = video_core::storage_path::video_part(&self.output_bucket, parsed.video_id, file_name);
            self.operations.upload_file(&key, segment_path, "video/mp4").await?;
        }

        info!(
            video_id = %event.video_id,
            segment_count = segments.len(),
            "split complete, publishing SPLITTING"
        );

        let mut next =
            VideoStatusChangedEvent::new(event.video_id, event.video_path.clone(), VideoEventStatus::Splitting);
        next.correlation_id = event.correlation_id.clone();
        next.trace_id = event.trace_id.clone();
        next.video_name = event.video_name.clone();
        next.duration = event.duration;
        self.event_bus.publish(next).await?;

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
impl MessageHandler<VideoStatusChangedEvent> for SplitHandler {
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
