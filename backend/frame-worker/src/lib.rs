//! Frame Worker
//!
//! Consumes `Video Status Changed` events with `status=SPLITTING`, extracts
//! frames from each segment at a configured rate, uploads them, and
//! publishes `COMPLETED` with a download URL (or `FAILED` on any segment
//! failure).

pub mod config;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod object_transfer;
pub mod time_range;

pub use config::Config;
pub use handler::FrameHandler;
