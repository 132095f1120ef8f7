//! Per-record scratch space on disk.
//!
//! A [`WorkArea`] owns the staged payload `<root>/<id>.<ext>` and the
//! detector's working directory `<root>/runs/<id>/`. Both are removed when
//! the area is dropped, whichever way processing ends.

use std::path::{Path, PathBuf};

use serveiq_core::types::RecordId;

/// Extension used when the payload format cannot be recognised.
const FALLBACK_EXTENSION: &str = "jpg";

/// Staged payload plus detector working directory for one record.
#[derive(Debug)]
pub struct WorkArea {
    staged: PathBuf,
    work_dir: PathBuf,
}

impl WorkArea {
    /// Write `payload` to disk and create the working directory.
    ///
    /// Paths are derived from `id`, so concurrent areas for different
    /// records never collide. On error, anything already created is
    /// removed before returning.
    pub async fn stage(root: &Path, id: RecordId, payload: &[u8]) -> std::io::Result<Self> {
        let ext = sniff_extension(payload);
        let area = Self {
            staged: root.join(format!("{id}.{ext}")),
            work_dir: root.join("runs").join(id.to_string()),
        };

        tokio::fs::create_dir_all(root).await?;
        tokio::fs::write(&area.staged, payload).await?;
        tokio::fs::create_dir_all(&area.work_dir).await?;

        tracing::debug!(
            record_id = %id,
            staged = %area.staged.display(),
            bytes = payload.len(),
            "Payload staged"
        );
        Ok(area)
    }

    /// The staged input file.
    pub fn staged(&self) -> &Path {
        &self.staged
    }

    /// Directory handed to the detector for its output.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

impl Drop for WorkArea {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.staged) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.staged.display(), error = %e, "Failed to remove staged file");
            }
        }
        if let Err(e) = std::fs::remove_dir_all(&self.work_dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.work_dir.display(), error = %e, "Failed to remove work directory");
            }
        }
    }
}

/// Pick a file extension from the payload's magic bytes.
fn sniff_extension(payload: &[u8]) -> &'static str {
    image::guess_format(payload)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or(FALLBACK_EXTENSION)
}
