//! Aggregate-level error taxonomy (the subset of the service-wide taxonomy
//! that the Video aggregate itself can raise).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VideoCoreError {
    #[error("cannot transition video from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("part {0} does not exist on this video")]
    PartNotFound(u32),

    #[error("video has already reached a terminal state ({0})")]
    TerminalState(String),

    #[error("cannot complete upload: {uploaded}/{total} parts uploaded")]
    IncompleteUpload { uploaded: u32, total: u32 },
}
