//! `generate-batch-of-urls`: pages through a video's un-presigned parts,
//! presigning a batch at a time. All-or-nothing: if any presign in the batch
//! fails, no part in the batch is mutated.

use crate::error::{AppError, Result};
use crate::state::AppState;
use futures::future::try_join_all;
use serde::Serialize;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;
use video_core::constants::{DEFAULT_BATCH_SIZE, PRESIGN_TTL_SECS};
use video_core::VideoStatus;

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateBatchOfUrlsResponse {
    pub urls: Vec<PartUrl>,
    pub upload_id: String,
    pub next_part_number: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartUrl {
    pub part_number: u32,
    pub url: String,
}

pub async fn generate_batch_of_urls(
    state: &AppState,
    video_id: Uuid,
    batch_size: Option<usize>,
) -> Result<GenerateBatchOfUrlsResponse> {
    let mut video = state
        .repository
        .find_by_id(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video {video_id} not found")))?;

    if !video.can_generate_more_urls() {
        return Err(AppError::PolicyViolation(format!(
            "video {video_id} is in status {:?}, which cannot accept more presigned URLs",
            video.status
        )));
    }

    let batch_size = batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
    let mut page = video.pending_parts_batch(batch_size);

    // The plan has more parts queued than are currently materialised; catch
    // the tail up to cover this page before presigning.
    if page.batch.len() < batch_size {
        if let Some(cursor) = page.next_part_number {
            if cursor as usize > video.parts.len() {
                video.ensure_parts_materialized_through(cursor + batch_size as u32 - 1);
                page = video.pending_parts_batch(batch_size);
            }
        }
    }

    let upload_id = video.storage.upload_id.clone();
    let key = video.storage.object_key.clone();
    let ttl = Duration::from_secs(PRESIGN_TTL_SECS);

    let presigned = try_join_all(page.batch.iter().map(|&part_number| {
        let key = key.clone();
        let upload_id = upload_id.clone();
        async move {
            state
                .object_store
                .presign_part_url(&key, &upload_id, part_number, ttl)
                .await
                .map(|url| (part_number, url))
        }
    }))
    .await?;

    for (part_number, url) in &presigned {
        video.assign_url_to_part(*part_number, url.clone())?;
    }
    if !presigned.is_empty() {
        state.repository.update_video_part(&video).await?;
    }

    if video.status == VideoStatus::Created {
        let expected = VideoStatus::Created;
        video.start_uploading_if_needed()?;
        state.repository.update_video(&video, expected).await?;
    }

    Ok(GenerateBatchOfUrlsResponse {
        urls: presigned
            .into_iter()
            .map(|(part_number, url)| PartUrl { part_number, url })
            .collect(),
        upload_id,
        next_part_number: page.next_part_number,
    })
}
