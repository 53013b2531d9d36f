//! Configuration for the frame-worker, loaded from environment variables.

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub object_store: ObjectStoreSection,
    pub queue: QueueConfig,
    pub segment_duration_secs: u32,
    pub frame_interval_secs: u32,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct ObjectStoreSection {
    /// Physical bucket the object-store client actually talks to.
    pub bucket: String,
    /// Logical bucket name embedded in the split-worker's segment keys.
    pub segments_bucket: String,
    /// Logical bucket name embedded in the frame keys this worker writes.
    pub output_bucket: String,
    pub region: String,
    pub internal_endpoint: Option<String>,
    pub public_endpoint: Option<String>,
}

#[derive(Clone, Debug)]
pub struct QueueConfig {
    pub queue_url: String,
    pub event_bus_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        Ok(Config {
            app: AppConfig {
                host: std::env::var("FRAME_WORKER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("FRAME_WORKER_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(8082),
            },
            object_store: ObjectStoreSection {
                bucket: std::env::var("VIDEO_BUCKET").unwrap_or_else(|_| "video-pipeline".to_string()),
                segments_bucket: std::env::var("S3_OUTPUT_BUCKET")
                    .unwrap_or_else(|_| "video-pipeline".to_string()),
                output_bucket: std::env::var("FRAME_OUTPUT_BUCKET")
                    .unwrap_or_else(|_| "video-pipeline".to_string()),
                region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                internal_endpoint: std::env::var("AWS_ENDPOINT").ok(),
                public_endpoint: std::env::var("AWS_PUBLIC_ENDPOINT").ok(),
            },
            queue: QueueConfig {
                queue_url: std::env::var("SQS_QUEUE_URL").unwrap_or_default(),
                event_bus_name: std::env::var("EVENT_BUS_NAME")
                    .unwrap_or_else(|_| "video-pipeline".to_string()),
            },
            segment_duration_secs: std::env::var("SEGMENT_DURATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(video_core::constants::DEFAULT_SEGMENT_DURATION_SECS),
            frame_interval_secs: std::env::var("FRAME_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(video_core::constants::DEFAULT_FRAME_INTERVAL_SECS),
        })
    }
}
