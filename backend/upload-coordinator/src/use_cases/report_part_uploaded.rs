//! `report-part-uploaded`: records a client's confirmation that one part's
//! `PUT` completed. Idempotent on repeat reports carrying the same etag.

use crate::error::{AppError, Result};
use crate::state::AppState;
use uuid::Uuid;
use video_core::VideoStatus;

pub async fn report_part_uploaded(
    state: &AppState,
    video_id: Uuid,
    part_number: u32,
    etag: String,
) -> Result<()> {
    let mut video = state
        .repository
        .find_by_id(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video {video_id} not found")))?;

    if video.status == VideoStatus::Created {
        let expected = VideoStatus::Created;
        video.start_uploading_if_needed()?;
        state.repository.update_video(&video, expected).await?;
    }

    video.mark_part_as_uploaded(part_number, etag)?;
    state.repository.update_video_part(&video).await?;

    Ok(())
}
