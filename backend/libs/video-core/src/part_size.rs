//! Part-Size Policy: pure function mapping a byte size to a multipart plan.

use crate::constants::{
    MAX_NUMBER_OF_PARTS, MAX_PART_SIZE_BYTES, MIN_PART_SIZE_BYTES, PART_SIZE_FLOOR_BYTES,
    SMALL_VIDEO_THRESHOLD_BYTES,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartSizeError {
    #[error("computed part size {0} bytes is below the object-store minimum of {MIN_PART_SIZE_BYTES} bytes")]
    TooSmallPart(i64),
    #[error("computed part size {0} bytes exceeds the object-store maximum of {MAX_PART_SIZE_BYTES} bytes")]
    TooLargePart(i64),
    #[error("plan requires {0} parts, exceeding the object-store maximum of {MAX_NUMBER_OF_PARTS}")]
    TooManyParts(u32),
    #[error("totalBytes must be positive, got {0}")]
    InvalidSize(i64),
}

/// Result of applying the part-size policy to a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartSizePlan {
    pub part_size: i64,
    pub number_of_parts: u32,
}

/// `totalBytes <= 5 MiB` bypasses multipart: a single virtual part.
pub fn is_small_video(total_bytes: i64) -> bool {
    total_bytes <= SMALL_VIDEO_THRESHOLD_BYTES
}

/// Compute `{partSize, numberOfParts}` for a video of `total_bytes`.
///
/// `partSize = max(ceil(total/10_000), 32 MiB)`, `numberOfParts = ceil(total/partSize)`.
pub fn calculate(total_bytes: i64) -> Result<PartSizePlan, PartSizeError> {
    if total_bytes <= 0 {
        return Err(PartSizeError::InvalidSize(total_bytes));
    }

    if is_small_video(total_bytes) {
        return Ok(PartSizePlan {
            part_size: total_bytes,
            number_of_parts: 1,
        });
    }

    let min_part_for_cap = div_ceil(total_bytes, MAX_NUMBER_OF_PARTS as i64);
    let part_size = min_part_for_cap.max(PART_SIZE_FLOOR_BYTES);

    if part_size < MIN_PART_SIZE_BYTES {
        return Err(PartSizeError::TooSmallPart(part_size));
    }
    if part_size > MAX_PART_SIZE_BYTES {
        return Err(PartSizeError::TooLargePart(part_size));
    }

    let number_of_parts = div_ceil(total_bytes, part_size) as u32;
    if number_of_parts > MAX_NUMBER_OF_PARTS {
        return Err(PartSizeError::TooManyParts(number_of_parts));
    }

    Ok(PartSizePlan {
        part_size,
        number_of_parts,
    })
}

fn div_ceil(a: i64, b: i64) -> i64 {
    (a + b - 1) / b
}
