pub mod media_tool;
pub mod workspace;

pub use media_tool::{run as run_media_tool, MediaToolError};
pub use workspace::ScopedWorkspace;
