//! Upload Coordinator
//!
//! Owns the multipart-upload lifecycle for incoming videos: issues presigned
//! part URLs, tracks per-part upload progress, and reconciles a video to
//! `UPLOADED` once the object store confirms every part landed.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod use_cases;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
