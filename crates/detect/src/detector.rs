//! Detector interface and shared types.

use std::path::PathBuf;
use std::time::Duration;

use serveiq_core::detection::DetectedObject;

/// Input to a single detection run.
#[derive(Debug, Clone)]
pub struct DetectRequest {
    /// Staged input file.
    pub source: PathBuf,
    /// Directory the detector may write its artifact and scratch files into.
    /// The caller owns it and removes it after the run.
    pub output_dir: PathBuf,
}

/// Outcome of a detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Findings in model-output order.
    pub objects: Vec<DetectedObject>,
    /// Where the detector wrote its annotated artifact. The file may be
    /// missing if the model chose not to save one.
    pub artifact: PathBuf,
}

/// Errors that can occur while running a detector.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// The detector process could not be started.
    #[error("Failed to spawn detector: {0}")]
    Spawn(#[source] std::io::Error),

    /// The detector exceeded its time budget and was killed.
    #[error("Detector timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The detector exited unsuccessfully.
    #[error("Detector failed with exit code {exit_code}: {stderr}")]
    Failed { exit_code: i32, stderr: String },

    /// The detector's report could not be parsed.
    #[error("Unreadable detector output: {0}")]
    Output(String),

    /// An I/O error while talking to the detector.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs object detection over a staged file.
pub trait Detector: Send + Sync {
    /// Detect objects in `request.source`.
    fn detect(
        &self,
        request: &DetectRequest,
    ) -> impl std::future::Future<Output = Result<Detection, DetectError>> + Send;
}
