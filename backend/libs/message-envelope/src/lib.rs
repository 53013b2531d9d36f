//! Wire schema for messages flowing across the event bus and the SQS queues
//! that connect the coordinator, split-worker, and frame-worker.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope metadata carried by every message, independent of payload shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageMetadata {
    pub message_id: String,
    pub correlation_id: String,
    pub trace_id: String,
    pub span_id: String,
    pub source: String,
    pub event_type: String,
    pub version: String,
    pub timestamp: String,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl MessageMetadata {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            correlation_id: Uuid::new_v4().to_string(),
            trace_id: Uuid::new_v4().to_string(),
            span_id: Uuid::new_v4().to_string(),
            source: source.into(),
            event_type: event_type.into(),
            version: "1".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            retry_count: 0,
            max_retries: 3,
        }
    }

    pub fn with_correlation(mut self, correlation_id: impl Into<String>, trace_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self.trace_id = trace_id.into();
        self
    }
}

/// Generic envelope wrapping a typed payload with routing/retry metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope<T> {
    pub metadata: MessageMetadata,
    pub payload: T,
}

impl<T> MessageEnvelope<T> {
    pub fn new(payload: T, source: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            metadata: MessageMetadata::new(source, event_type),
            payload,
        }
    }

    pub fn is_retry_exhausted(&self) -> bool {
        self.metadata.retry_count >= self.metadata.max_retries
    }
}

/// Status values a `Video Status Changed` event can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VideoEventStatus {
    Uploaded,
    Splitting,
    Printing,
    Completed,
    Failed,
    Processing,
}

/// Payload for the `Video Status Changed` event published by the Reconcile
/// service, the split-worker, and the frame-worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStatusChangedEvent {
    pub video_id: Uuid,
    pub video_path: String,
    pub status: VideoEventStatus,
    pub correlation_id: String,
    pub trace_id: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl VideoStatusChangedEvent {
    pub fn new(video_id: Uuid, video_path: impl Into<String>, status: VideoEventStatus) -> Self {
        Self {
            video_id,
            video_path: video_path.into(),
            status,
            correlation_id: Uuid::new_v4().to_string(),
            trace_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            video_name: None,
            duration: None,
            download_url: None,
            error_reason: None,
        }
    }
}

/// Payload for the object store's `CompleteMultipartUpload` notification,
/// consumed by the complete-multipart consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreCompletionEvent {
    pub bucket: BucketRef,
    pub object: ObjectRef,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_through_json() {
        let event = VideoStatusChangedEvent::new(Uuid::new_v4(), "bucket/video/x/file/a.mp4", VideoEventStatus::Uploaded);
        let envelope = MessageEnvelope::new(event, "video-pipeline.upload-coordinator", "VideoStatusChanged");

        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: MessageEnvelope<VideoStatusChangedEvent> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.payload.video_path, envelope.payload.video_path);
        assert_eq!(parsed.metadata.event_type, "VideoStatusChanged");
    }

    #[test]
    fn retry_exhaustion_is_detected() {
        let mut envelope = MessageEnvelope::new((), "source", "Type");
        envelope.metadata.max_retries = 2;
        envelope.metadata.retry_count = 2;
        assert!(envelope.is_retry_exhausted());
        envelope.metadata.retry_count = 1;
        assert!(!envelope.is_retry_exhausted());
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&VideoEventStatus::Splitting).unwrap();
        assert_eq!(json, "\"SPLITTING\"");
    }
}
