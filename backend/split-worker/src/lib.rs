//! Split Worker
//!
//! Consumes `Video Status Changed` events with `status=UPLOADED`, segments
//! the source video into fixed-duration parts, uploads them, and publishes
//! `SPLITTING` (or `FAILED` on a non-retryable error).

pub mod config;
pub mod error;
pub mod handler;
pub mod object_transfer;
pub mod segmenter;

pub use config::Config;
pub use handler::SplitHandler;
