use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// WebSocket endpoint of the ingest server's notification channel.
    pub server_ws_url: String,
    /// Directory for staged payloads and detector working directories.
    pub staging_dir: PathBuf,
    /// Detector program to run per record.
    pub detector_program: String,
    /// Arguments placed before `--source` / `--output-dir`.
    pub detector_args: Vec<String>,
    /// Time budget for one detection run.
    pub detector_timeout: Duration,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                   |
    /// |-------------------------|---------------------------|
    /// | `DATABASE_URL`          | required                  |
    /// | `SERVER_WS_URL`         | `ws://localhost:5000/ws`  |
    /// | `STAGING_DIR`           | `uploads`                 |
    /// | `DETECTOR_PROGRAM`      | `python3`                 |
    /// | `DETECTOR_ARGS`         | `detect.py`               |
    /// | `DETECTOR_TIMEOUT_SECS` | `600`                     |
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let server_ws_url =
            std::env::var("SERVER_WS_URL").unwrap_or_else(|_| "ws://localhost:5000/ws".into());

        let staging_dir = std::env::var("STAGING_DIR")
            .unwrap_or_else(|_| "uploads".into())
            .into();

        let detector_program =
            std::env::var("DETECTOR_PROGRAM").unwrap_or_else(|_| "python3".into());

        let detector_args = split_args(
            &std::env::var("DETECTOR_ARGS").unwrap_or_else(|_| "detect.py".into()),
        );

        let detector_timeout_secs: u64 = std::env::var("DETECTOR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("DETECTOR_TIMEOUT_SECS must be a valid u64");

        Self {
            database_url,
            server_ws_url,
            staging_dir,
            detector_program,
            detector_args,
            detector_timeout: Duration::from_secs(detector_timeout_secs),
        }
    }
}

/// Split a whitespace-separated argument list.
fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_args_ignores_extra_whitespace() {
        assert_eq!(
            split_args("  detect.py   --weights trash_detect.pt "),
            vec!["detect.py", "--weights", "trash_detect.pt"]
        );
        assert!(split_args("   ").is_empty());
    }
}
