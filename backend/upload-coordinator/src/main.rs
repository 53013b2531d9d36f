//! Upload Coordinator - HTTP Server
//!
//! Handles the multipart-upload lifecycle for incoming videos: issues
//! presigned part URLs, tracks per-part progress, reconciles completion.

use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use aws_sdk_eventbridge::Client as EventBridgeClient;
use event_bus::EventBridgeAdapter;
use object_store::{ObjectStoreConfig, S3ObjectStore};
use std::io;
use std::sync::Arc;
use upload_coordinator::{middleware::CorrelationMiddleware, state::AppState, Config};
use video_repository::PostgresVideoRepository;

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env().expect("failed to load configuration");

    let db_config = db_pool::DbConfig::for_service("upload-coordinator");
    let pool = db_pool::create_pool(db_config)
        .await
        .expect("failed to create database pool");
    db_pool::migrate(&pool, "./migrations")
        .await
        .expect("failed to run database migrations");

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

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(address = %bind_address, "upload coordinator listening");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(pool.clone()))
            .wrap(actix_middleware::Logger::default())
            .wrap(CorrelationMiddleware)
            .configure(upload_coordinator::handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
