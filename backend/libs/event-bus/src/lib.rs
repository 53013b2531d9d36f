//! Publishes `Video Status Changed` events onto the event bus that connects
//! the upload coordinator, split-worker, and frame-worker.

pub mod error;

pub use error::EventBusError;

use async_trait::async_trait;
use aws_sdk_eventbridge::types::PutEventsRequestEntry;
use aws_sdk_eventbridge::Client;
use message_envelope::VideoStatusChangedEvent;
use resilience::presets;
use tracing::{debug, warn};

const SOURCE: &str = "fiapx.video";
const DETAIL_TYPE: &str = "Video Status Changed";

#[async_trait]
pub trait EventBusAdapter: Send + Sync {
    async fn publish(&self, event: VideoStatusChangedEvent) -> Result<(), EventBusError>;
}

#[derive(Clone)]
pub struct EventBridgeAdapter {
    client: Client,
    event_bus_name: String,
}

impl EventBridgeAdapter {
    pub fn new(client: Client, event_bus_name: impl Into<String>) -> Self {
        Self {
            client,
            event_bus_name: event_bus_name.into(),
        }
    }
}

#[async_trait]
impl EventBusAdapter for EventBridgeAdapter {
    async fn publish(&self, event: VideoStatusChangedEvent) -> Result<(), EventBusError> {
        let detail = serde_json::to_string(&event)
            .map_err(|e| EventBusError::Serialization(e.to_string()))?;

        let entry = PutEventsRequestEntry::builder()
            .source(SOURCE)
            .detail_type(DETAIL_TYPE)
            .detail(detail)
            .event_bus_name(&self.event_bus_name)
            .build();

        let service_config = presets::event_bus_config();
        let timeout_duration = service_config.timeout.duration;

        let outcome = resilience::with_timeout_result(timeout_duration, async {
            self.client
                .put_events()
                .entries(entry)
                .send()
                .await
                .map_err(|e| e.to_string())
        })
        .await;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => return Err(EventBusError::Unavailable(e.to_string())),
        };

        if response.failed_entry_count() > 0 {
            let reason = response
                .entries()
                .iter()
                .find_map(|e| e.error_message())
                .unwrap_or("unknown rejection")
                .to_string();
            warn!(video_id = %event.video_id, reason = %reason, "event bus rejected entry");
            return Err(EventBusError::Rejected(reason));
        }

        debug!(video_id = %event.video_id, status = ?event.status, "published video status changed event");
        Ok(())
    }
}

/// In-memory adapter for use-case and worker tests: records every published
/// event instead of calling out to EventBridge.
#[derive(Default)]
pub struct InMemoryEventBus {
    published: std::sync::Mutex<Vec<VideoStatusChangedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<VideoStatusChangedEvent> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventBusAdapter for InMemoryEventBus {
    async fn publish(&self, event: VideoStatusChangedEvent) -> Result<(), EventBusError> {
        self.published.lock().unwrap().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use message_envelope::VideoEventStatus;
    use uuid::Uuid;

    #[tokio::test]
    async fn in_memory_bus_records_published_events() {
        let bus = InMemoryEventBus::new();
        let event = VideoStatusChangedEvent::new(Uuid::new_v4(), "bucket/video/x/file/a.mp4", VideoEventStatus::Uploaded);
        bus.publish(event.clone()).await.unwrap();

        let published = bus.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].video_id, event.video_id);
    }
}
