//! Complete-Multipart Consumer - background queue consumer
//!
//! Consumes the object store's completion notification directly, bypassing
//! the HTTP `complete-upload` route entirely. Safe to run concurrently with
//! it: both paths fold into the same idempotent `reconcile` receiver, so
//! whichever one observes the video first wins and the other is a no-op.

use actix_web::{web, App, HttpResponse, HttpServer};
use async_trait::async_trait;
use aws_sdk_eventbridge::Client as EventBridgeClient;
use aws_sdk_sqs::Client as SqsClient;
use event_bus::EventBridgeAdapter;
use message_envelope::{MessageMetadata, ObjectStoreCompletionEvent};
use object_store::{ObjectStoreConfig, S3ObjectStore};
use queue_runtime::{ConsumerConfig, HandlerError, MessageConsumer, MessageHandler};
use std::io;
use std::sync::Arc;
use tokio::sync::oneshot;
use upload_coordinator::use_cases::reconcile_from_webhook::reconcile_from_webhook;
use upload_coordinator::{state::AppState, Config};
use video_repository::PostgresVideoRepository;

/// Patterns that mark a reconcile failure as permanent, matching the other
/// consumers' classification convention.
const NON_RETRYABLE_PATTERNS: &[&str] = &["404", "does not exist", "not found", "invalid"];

struct CompleteMultipartHandler {
    state: AppState,
}

impl CompleteMultipartHandler {
    fn classify(err: &upload_coordinator::AppError) -> HandlerError {
        let message = err.to_string();
        let non_retryable = matches!(err, upload_coordinator::AppError::NotFound(_))
            || NON_RETRYABLE_PATTERNS.iter().any(|p| message.to_lowercase().contains(p));
        if non_retryable {
            HandlerError::NonRetryable(message)
        } else {
            HandlerError::Retryable(message)
        }
    }
}

#[async_trait]
impl MessageHandler<ObjectStoreCompletionEvent> for CompleteMultipartHandler {
    async fn handle(&self, payload: ObjectStoreCompletionEvent, _metadata: &MessageMetadata) -> Result<(), HandlerError> {
        match reconcile_from_webhook(&self.state, &payload.bucket.name, &payload.object.key).await {
            Ok(outcome) => {
                tracing::info!(
                    bucket = %payload.bucket.name,
                    key = %payload.object.key,
                    status = ?outcome.status,
                    skipped = outcome.skipped,
                    "processed object store completion notification"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    bucket = %payload.bucket.name,
                    key = %payload.object.key,
                    error = %err,
                    "failed to reconcile from webhook"
                );
                Err(Self::classify(&err))
            }
        }
    }
}

async fn get_health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

async fn get_metrics() -> HttpResponse {
    use prometheus::{Encoder, TextEncoder};
    let metric_families = prometheus::gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::Ok().content_type(encoder.format_type()).body(buffer)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env().expect("failed to load configuration");

    let db_config = db_pool::DbConfig::for_service("complete-multipart-consumer");
    let pool = db_pool::create_pool(db_config)
        .await
        .expect("failed to create database pool");

    let object_store_config = ObjectStoreConfig {
        bucket: config.object_store.bucket.clone(),
        region: config.object_store.region.clone(),
        internal_endpoint: config.object_store.internal_endpoint.clone(),
        public_endpoint: config.object_store.public_endpoint.clone(),
        path_style: true,
        presigned_url_expiration_secs: video_core::constants::PRESIGN_TTL_SECS,
    };
    let object_store = S3ObjectStore::new(object_store_config)
        .await
        .expect("failed to initialize object store client");

    let aws_shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_sdk_s3::config::Region::new(config.object_store.region.clone()))
        .load()
        .await;
    let event_bus = EventBridgeAdapter::new(
        EventBridgeClient::new(&aws_shared_config),
        config.queue.event_bus_name.clone(),
    );

    let state = AppState {
        repository: Arc::new(PostgresVideoRepository::new(pool.clone())),
        object_store: Arc::new(object_store),
        event_bus: Arc::new(event_bus),
        config: Arc::new(config.clone()),
    };

    let handler = CompleteMultipartHandler { state };

    let sqs_client = SqsClient::new(&aws_shared_config);
    let consumer_config = ConsumerConfig {
        queue_url: config.queue.complete_multipart_queue_url.clone(),
        ..ConsumerConfig::default()
    };
    let consumer = MessageConsumer::new(sqs_client, consumer_config, handler);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let consumer_handle = tokio::spawn(async move {
        if let Err(e) = consumer.run(shutdown_rx).await {
            tracing::error!(error = %e, "consumer loop terminated with an error");
        }
    });

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(address = %bind_address, "complete-multipart-consumer health server listening");

    let server = HttpServer::new(|| {
        App::new()
            .route("/health", web::get().to(get_health))
            .route("/metrics", web::get().to(get_metrics))
    })
    .bind(&bind_address)?
    .run();

    server.await?;

    let _ = shutdown_tx.send(());
    let _ = consumer_handle.await;
    Ok(())
}
