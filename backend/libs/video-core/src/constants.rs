//! Video pipeline constants

/// Below this size a video bypasses multipart entirely (single virtual part).
pub const SMALL_VIDEO_THRESHOLD_BYTES: i64 = 5 * 1024 * 1024;

/// Object-store hard floor for any part but the last.
pub const MIN_PART_SIZE_BYTES: i64 = 5 * 1024 * 1024;

/// Object-store hard ceiling for a single part.
pub const MAX_PART_SIZE_BYTES: i64 = 5 * 1024 * 1024 * 1024;

/// Object-store hard ceiling on the number of parts in one multipart upload.
pub const MAX_NUMBER_OF_PARTS: u32 = 10_000;

/// Floor applied to the computed part size so small-but-not-tiny videos
/// don't get a degenerate number of parts.
pub const PART_SIZE_FLOOR_BYTES: i64 = 32 * 1024 * 1024;

/// Allowed source file extensions (case-insensitive, leading dot optional).
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Default number of presigned URLs returned per `generate-batch-of-urls` call.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Parts eagerly materialised at `create-video` time; plans larger than this
/// materialise the remainder lazily as `generate-batch-of-urls` walks past
/// the materialised tail.
pub const MATERIALIZED_PART_CAP: u32 = 2_000;

/// Default presigned URL time-to-live.
pub const PRESIGN_TTL_SECS: u64 = 3600;

/// Default split-worker segment duration.
pub const DEFAULT_SEGMENT_DURATION_SECS: u32 = 10;

/// Default frame-worker sampling interval.
pub const DEFAULT_FRAME_INTERVAL_SECS: u32 = 1;
