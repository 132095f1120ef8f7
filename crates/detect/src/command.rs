//! Detector backed by an external model program.
//!
//! The program is invoked as
//! `<program> <args...> --source <file> --output-dir <dir>` and must print a
//! JSON report on stdout:
//!
//! ```json
//! {"detections": [{"label": "Garbage", "confidence": 0.87}], "artifact": "/optional/path"}
//! ```
//!
//! When `artifact` is omitted the annotated output is expected at
//! `<dir>/<source file name>`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serveiq_core::detection::DetectedObject;
use tokio::process::Command;

use crate::artifact::default_artifact_path;
use crate::detector::{DetectError, DetectRequest, Detection, Detector};
use crate::subprocess::run_command;

/// Default time budget for one detection run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Runs a model program as a child process per detection.
#[derive(Debug, Clone)]
pub struct CommandDetector {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct DetectorReport {
    #[serde(default)]
    detections: Vec<RawDetection>,
    #[serde(default)]
    artifact: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    label: String,
    confidence: f32,
}

impl CommandDetector {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_command(&self, request: &DetectRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--source")
            .arg(&request.source)
            .arg("--output-dir")
            .arg(&request.output_dir);
        cmd
    }
}

impl Detector for CommandDetector {
    async fn detect(&self, request: &DetectRequest) -> Result<Detection, DetectError> {
        let mut cmd = self.build_command(request);
        let output = run_command(&mut cmd, self.timeout).await?;

        tracing::debug!(
            program = %self.program,
            exit_code = output.exit_code,
            duration_ms = output.duration.as_millis() as u64,
            "Detector finished",
        );

        if output.exit_code != 0 {
            return Err(DetectError::Failed {
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        parse_report(&output.stdout, request)
    }
}

/// Turn the detector's stdout into a [`Detection`].
///
/// Only the last non-empty line is parsed so models that print progress
/// before the report still work.
fn parse_report(stdout: &str, request: &DetectRequest) -> Result<Detection, DetectError> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| DetectError::Output("empty output".into()))?;

    let report: DetectorReport =
        serde_json::from_str(line).map_err(|e| DetectError::Output(e.to_string()))?;

    let objects = report
        .detections
        .into_iter()
        .map(|d| DetectedObject::from_raw(d.label, d.confidence))
        .collect();

    let artifact = report
        .artifact
        .unwrap_or_else(|| default_artifact_path(&request.source, &request.output_dir));

    Ok(Detection { objects, artifact })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn request() -> DetectRequest {
        DetectRequest {
            source: PathBuf::from("/tmp/staging/abc.jpg"),
            output_dir: PathBuf::from("/tmp/staging/runs/abc"),
        }
    }

    #[test]
    fn parse_report_keeps_model_order_and_rounds() {
        let stdout = r#"{"detections":[{"label":"Garbage","confidence":0.874},{"label":"Upright_Bin","confidence":0.5}]}"#;
        let detection = parse_report(stdout, &request()).unwrap();

        assert_eq!(detection.objects.len(), 2);
        assert_eq!(detection.objects[0].label, "Garbage");
        assert_eq!(detection.objects[0].confidence, 87);
        assert_eq!(detection.objects[1].label, "Upright_Bin");
        assert_eq!(detection.objects[1].confidence, 50);
    }

    #[test]
    fn parse_report_defaults_artifact_to_output_dir() {
        let detection = parse_report(r#"{"detections":[]}"#, &request()).unwrap();
        assert!(detection.objects.is_empty());
        assert_eq!(
            detection.artifact,
            PathBuf::from("/tmp/staging/runs/abc/abc.jpg")
        );
    }

    #[test]
    fn parse_report_honours_explicit_artifact() {
        let stdout = "loading model...\n{\"detections\":[],\"artifact\":\"/out/annotated.jpg\"}\n";
        let detection = parse_report(stdout, &request()).unwrap();
        assert_eq!(detection.artifact, PathBuf::from("/out/annotated.jpg"));
    }

    #[test]
    fn parse_report_rejects_garbage() {
        assert_matches!(
            parse_report("Traceback (most recent call last)", &request()),
            Err(DetectError::Output(_))
        );
        assert_matches!(parse_report("  \n", &request()), Err(DetectError::Output(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_program_and_passes_paths() {
        // The script echoes back the --source value as the artifact.
        let script = r#"printf '{"detections":[{"label":"Garbage","confidence":0.66}],"artifact":"%s"}\n' "$2""#;
        let detector = CommandDetector::new("sh", vec!["-c".into(), script.into(), "sh".into()]);

        let detection = detector.detect(&request()).await.unwrap();
        assert_eq!(detection.objects[0].confidence, 66);
        assert_eq!(detection.artifact, PathBuf::from("/tmp/staging/abc.jpg"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_failure() {
        let detector = CommandDetector::new(
            "sh",
            vec!["-c".into(), "echo boom >&2; exit 3".into(), "sh".into()],
        );

        let err = detector.detect(&request()).await.unwrap_err();
        assert_matches!(err, DetectError::Failed { exit_code: 3, ref stderr } if stderr == "boom");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn chatty_detector_is_not_blocked_past_output_cap() {
        // 11 MiB on stderr, one more MiB than is kept.
        let script = r#"head -c 11534336 /dev/zero >&2; printf '{"detections":[]}\n'"#;
        let detector = CommandDetector::new("sh", vec!["-c".into(), script.into(), "sh".into()])
            .with_timeout(Duration::from_secs(30));

        let detection = detector.detect(&request()).await.unwrap();
        assert!(detection.objects.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_detector_times_out() {
        let detector = CommandDetector::new("sh", vec!["-c".into(), "sleep 5".into(), "sh".into()])
            .with_timeout(Duration::from_millis(100));

        let err = detector.detect(&request()).await.unwrap_err();
        assert_matches!(err, DetectError::Timeout(_));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let detector = CommandDetector::new("serveiq-no-such-detector-binary", vec![]);
        let err = detector.detect(&request()).await.unwrap_err();
        assert_matches!(err, DetectError::Spawn(_));
    }
}
