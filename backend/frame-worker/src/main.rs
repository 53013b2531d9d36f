//! Frame Worker - background queue consumer
//!
//! Extracts frames from split video segments. Runs a small actix-web server
//! alongside the consumer loop purely for `/health` and `/metrics`, matching
//! how every other service in this pipeline exposes its ambient operability
//! surface.

use actix_web::{web, App, HttpResponse, HttpServer};
use aws_sdk_eventbridge::Client as EventBridgeClient;
use aws_sdk_sqs::Client as SqsClient;
use event_bus::EventBridgeAdapter;
use frame_worker::config::Config;
use frame_worker::extractor::SubprocessFrameExtractor;
use frame_worker::handler::FrameHandler;
use object_store::{ObjectStoreConfig, S3ObjectStore};
use queue_runtime::{ConsumerConfig, MessageConsumer};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

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

    let aws_shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_sdk_s3::config::Region::new(config.object_store.region.clone()))
        .load()
        .await;

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

    let event_bus = EventBridgeAdapter::new(
        EventBridgeClient::new(&aws_shared_config),
        config.queue.event_bus_name.clone(),
    );

    let extractor = SubprocessFrameExtractor::new(
        std::env::var("MEDIA_TOOL_BINARY").unwrap_or_else(|_| "ffmpeg".to_string()),
        Duration::from_secs(300),
    );

    let handler = FrameHandler::new(
        Arc::new(object_store.operations()),
        Arc::new(event_bus),
        Arc::new(extractor),
        config.object_store.segments_bucket.clone(),
        config.object_store.output_bucket.clone(),
        config.object_store.public_endpoint.clone(),
        config.segment_duration_secs,
        config.frame_interval_secs,
    );

    let sqs_client = SqsClient::new(&aws_shared_config);
    let consumer_config = ConsumerConfig {
        queue_url: config.queue.queue_url.clone(),
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
    tracing::info!(address = %bind_address, "frame-worker health server listening");

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
