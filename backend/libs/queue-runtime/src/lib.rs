//! Generic typed-payload message consumer: long-poll SQS, dispatch to a
//! handler, ack on success, leave retryable failures for redelivery, and
//! ack-and-drop poison messages so they never block the queue.

pub mod error;

pub use error::{ConsumerError, HandlerError};

use async_trait::async_trait;
use aws_sdk_sqs::Client;
use correlation_context::CorrelationContext;
use message_envelope::{MessageEnvelope, MessageMetadata};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Implemented by each worker's business logic. `T` is the envelope's typed
/// payload (e.g. `VideoStatusChangedEvent`).
#[async_trait]
pub trait MessageHandler<T>: Send + Sync {
    async fn handle(&self, payload: T, metadata: &MessageMetadata) -> Result<(), HandlerError>;
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub queue_url: String,
    /// SQS caps a single receive at 10 messages regardless of this value.
    pub batch_size: i32,
    pub wait_time_seconds: i32,
    pub visibility_timeout_secs: i32,
    /// Bounded concurrency of handler invocations per consumer.
    pub max_concurrency: usize,
    /// Visibility is extended in increments of `visibility_timeout_secs`
    /// until this multiple of the original timeout is reached.
    pub visibility_extension_ceiling_multiplier: u32,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            queue_url: String::new(),
            batch_size: 10,
            wait_time_seconds: 20,
            visibility_timeout_secs: 30,
            max_concurrency: 1,
            visibility_extension_ceiling_multiplier: 12,
        }
    }
}

pub struct MessageConsumer<T, H> {
    client: Client,
    config: ConsumerConfig,
    handler: Arc<H>,
    _payload: std::marker::PhantomData<T>,
}

impl<T, H> MessageConsumer<T, H>
where
    T: serde::de::DeserializeOwned + Send + 'static,
    H: MessageHandler<T> + 'static,
{
    pub fn new(client: Client, config: ConsumerConfig, handler: H) -> Self {
        Self {
            client,
            config,
            handler: Arc::new(handler),
            _payload: std::marker::PhantomData,
        }
    }

    /// Polls until `shutdown` fires, then stops fetching new messages and
    /// drains in-flight handlers before returning.
    pub async fn run(&self, mut shutdown: oneshot::Receiver<()>) -> Result<(), ConsumerError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut in_flight = JoinSet::new();

        loop {
            if shutdown.try_recv().is_ok() {
                break;
            }

            let batch = tokio::select! {
                result = self.receive_batch() => result?,
                _ = &mut shutdown => break,
            };

            for message in batch {
                let semaphore = semaphore.clone();
                let client = self.client.clone();
                let handler = self.handler.clone();
                let config = self.config.clone();

                let permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                in_flight.spawn(async move {
                    let _permit = permit;
                    process_message(&client, &config, &handler, message).await;
                });
            }

            // Bound memory: don't let completed tasks accumulate indefinitely.
            while in_flight.len() > self.config.max_concurrency * 4 {
                in_flight.join_next().await;
            }
        }

        debug!("shutdown signal received, draining in-flight handlers");
        while in_flight.join_next().await.is_some() {}
        Ok(())
    }

    async fn receive_batch(&self) -> Result<Vec<aws_sdk_sqs::types::Message>, ConsumerError> {
        let response = self
            .client
            .receive_message()
            .queue_url(&self.config.queue_url)
            .max_number_of_messages(self.config.batch_size.min(10))
            .wait_time_seconds(self.config.wait_time_seconds)
            .visibility_timeout(self.config.visibility_timeout_secs)
            .send()
            .await
            .map_err(|e| ConsumerError::QueueUnavailable(e.to_string()))?;

        Ok(response.messages().to_vec())
    }
}

async fn process_message<T, H>(
    client: &Client,
    config: &ConsumerConfig,
    handler: &H,
    message: aws_sdk_sqs::types::Message,
) where
    T: serde::de::DeserializeOwned + Send,
    H: MessageHandler<T> + ?Sized,
{
    let Some(body) = message.body() else {
        warn!("received message with no body, leaving for redelivery");
        return;
    };
    let Some(receipt_handle) = message.receipt_handle() else {
        warn!("received message with no receipt handle, skipping");
        return;
    };

    let envelope: MessageEnvelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            error!(error = %e, "message body failed to parse, ack-and-drop (poison)");
            ack(client, &config.queue_url, receipt_handle).await;
            return;
        }
    };

    let metadata = envelope.metadata.clone();
    let ctx = CorrelationContext::from_parts(Some(metadata.correlation_id.clone()), None);

    let extension_handle = spawn_visibility_extension(
        client.clone(),
        config.queue_url.clone(),
        receipt_handle.to_string(),
        config.visibility_timeout_secs,
        config.visibility_extension_ceiling_multiplier,
    );

    let outcome = ctx
        .scope(handler.handle(envelope.payload, &metadata))
        .await;

    extension_handle.abort();

    match outcome {
        Ok(()) => {
            debug!(message_id = %metadata.message_id, "handler succeeded, acknowledging");
            ack(client, &config.queue_url, receipt_handle).await;
        }
        Err(e) if e.is_retryable() => {
            warn!(message_id = %metadata.message_id, error = %e, "retryable failure, leaving for redelivery");
        }
        Err(e) => {
            error!(message_id = %metadata.message_id, error = %e, "non-retryable failure, ack-and-drop");
            ack(client, &config.queue_url, receipt_handle).await;
        }
    }
}

async fn ack(client: &Client, queue_url: &str, receipt_handle: &str) {
    if let Err(e) = client
        .delete_message()
        .queue_url(queue_url)
        .receipt_handle(receipt_handle)
        .send()
        .await
    {
        error!(error = %e, "failed to delete acknowledged message");
    }
}

/// Extends visibility in increments of `visibility_timeout_secs` while the
/// handler is still running, up to `ceiling_multiplier` times the original
/// timeout, then stops (letting the message redrive if the handler is truly
/// stuck).
fn spawn_visibility_extension(
    client: Client,
    queue_url: String,
    receipt_handle: String,
    visibility_timeout_secs: i32,
    ceiling_multiplier: u32,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let interval = Duration::from_secs(visibility_timeout_secs.max(1) as u64 * 3 / 4);
        let max_extensions = ceiling_multiplier.saturating_sub(1);
        for _ in 0..max_extensions {
            tokio::time::sleep(interval).await;
            if let Err(e) = client
                .change_message_visibility()
                .queue_url(&queue_url)
                .receipt_handle(&receipt_handle)
                .visibility_timeout(visibility_timeout_secs)
                .send()
                .await
            {
                warn!(error = %e, "failed to extend visibility, handler may be redelivered");
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = ConsumerConfig::default();
        assert_eq!(config.wait_time_seconds, 20);
        assert_eq!(config.visibility_timeout_secs, 30);
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.visibility_extension_ceiling_multiplier, 12);
    }

    #[test]
    fn retryable_and_non_retryable_are_distinguished() {
        assert!(HandlerError::Retryable("timeout".into()).is_retryable());
        assert!(!HandlerError::NonRetryable("validation failed".into()).is_retryable());
    }
}
