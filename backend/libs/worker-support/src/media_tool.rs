//! Bounded invocation of the external media tool (the ffmpeg-equivalent
//! binary; out of scope for this repo, invoked as a subprocess contract).

use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum MediaToolError {
    #[error("media tool timed out after {0:?}")]
    TimedOut(Duration),
    #[error("media tool failed to start: {0}")]
    Spawn(String),
    #[error("media tool exited with status {status}: {stderr}")]
    NonZeroExit { status: i32, stderr: String },
}

/// Runs `program args…` to completion, capturing stderr for diagnostics and
/// enforcing a hard wall-clock ceiling — every subprocess wait in this
/// pipeline is bounded, matching every other external call.
pub async fn run(program: &str, args: &[&str], timeout: Duration) -> Result<(), MediaToolError> {
    let mut command = Command::new(program);
    command.args(args).stdout(Stdio::null()).stderr(Stdio::piped());

    let child = command.spawn().map_err(|e| MediaToolError::Spawn(e.to_string()))?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| MediaToolError::TimedOut(timeout))?
        .map_err(|e| MediaToolError::Spawn(e.to_string()))?;

    if !output.status.success() {
        return Err(MediaToolError::NonZeroExit {
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}
