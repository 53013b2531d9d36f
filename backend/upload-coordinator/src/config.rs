//! Configuration for the upload coordinator, loaded from environment variables.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub object_store: ObjectStoreSection,
    pub queue: QueueConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ObjectStoreSection {
    pub bucket: String,
    pub region: String,
    pub internal_endpoint: Option<String>,
    pub public_endpoint: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QueueConfig {
    pub event_bus_name: String,
    pub complete_multipart_queue_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        Ok(Config {
            app: AppConfig {
                host: std::env::var("UPLOAD_COORDINATOR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("UPLOAD_COORDINATOR_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(8080),
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/video_pipeline".to_string()),
            },
            object_store: ObjectStoreSection {
                bucket: std::env::var("VIDEO_BUCKET").unwrap_or_else(|_| "video-pipeline".to_string()),
                region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                internal_endpoint: std::env::var("AWS_ENDPOINT").ok(),
                public_endpoint: std::env::var("AWS_PUBLIC_ENDPOINT").ok(),
            },
            queue: QueueConfig {
                event_bus_name: std::env::var("EVENT_BUS_NAME")
                    .unwrap_or_else(|_| "video-pipeline".to_string()),
                complete_multipart_queue_url: std::env::var("COMPLETE_MULTIPART_QUEUE_URL")
                    .unwrap_or_default(),
            },
        })
    }
}
