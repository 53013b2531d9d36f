//! `create-video`: validates the request, computes the multipart plan,
//! initiates the upload against the object store, and persists a freshly
//! materialised `Video` in `CREATED` status.

use crate::error::{AppError, Result};
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;
use video_core::constants::MATERIALIZED_PART_CAP;
use video_core::{calculate_part_plan, is_small_video, validate_extension, Video, VideoMetadata, VideoStorage};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVideoRequest {
    pub user_id: Uuid,
    pub total_size_bytes: i64,
    pub duration_ms: i64,
    pub filename: String,
    pub extension: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateVideoResponse {
    pub video_id: Uuid,
    pub upload_id: String,
    pub object_key: String,
    pub part_size_bytes: i64,
    pub number_of_parts: u32,
}

pub async fn create_video(state: &AppState, request: CreateVideoRequest) -> Result<CreateVideoResponse> {
    if !validate_extension(&request.extension) {
        return Err(AppError::Validation(format!(
            "extension '{}' is not one of the supported video formats",
            request.extension
        )));
    }

    let plan = calculate_part_plan(request.total_size_bytes)?;
    let id = Uuid::new_v4();
    let bucket = state.config.object_store.bucket.clone();
    let object_key = video_core::storage_path::video_file(&bucket, id, &request.filename);

    let upload = state.object_store.initiate_multipart(&object_key).await?;

    let metadata = VideoMetadata {
        total_size_bytes: request.total_size_bytes,
        duration_ms: request.duration_ms,
        filename: request.filename,
        extension: request.extension,
    };
    let storage = VideoStorage {
        upload_id: upload.upload_id.clone(),
        object_key: object_key.clone(),
        bucket,
    };

    // Single-part small videos materialise in full regardless of the cap;
    // large plans eagerly materialise only the first MATERIALIZED_PART_CAP
    // parts, with the remainder picked up lazily by generate-batch-of-urls.
    let materialized_parts = if is_small_video(request.total_size_bytes) {
        plan.number_of_parts
    } else {
        plan.number_of_parts.min(MATERIALIZED_PART_CAP)
    };

    let video = Video::with_materialized_parts(
        id,
        request.user_id,
        metadata,
        storage,
        plan.number_of_parts,
        plan.part_size,
        materialized_parts,
    );

    if let Err(err) = state.repository.create_video(&video).await {
        error!(video_id = %id, upload_id = %upload.upload_id, error = %err, "failed to persist video after initiating multipart upload, aborting");
        if let Err(abort_err) = state.object_store.abort_multipart(&object_key, &upload.upload_id).await {
            error!(video_id = %id, upload_id = %upload.upload_id, error = %abort_err, "abort_multipart also failed, upload left dangling in the store");
        }
        return Err(err.into());
    }

    info!(video_id = %id, number_of_parts = plan.number_of_parts, materialized_parts, "video created");

    Ok(CreateVideoResponse {
        video_id: id,
        upload_id: upload.upload_id,
        object_key,
        part_size_bytes: plan.part_size,
        number_of_parts: plan.number_of_parts,
    })
}
