//! Locating and normalising detector artifacts.

use std::path::{Path, PathBuf};

/// Artifact extensions that are renamed before being read back.
const CONTAINER_RENAMES: &[(&str, &str)] = &[("avi", "mp4")];

/// Where a detector writes its artifact when it does not say otherwise:
/// `<output_dir>/<source file name>`.
pub fn default_artifact_path(source: &Path, output_dir: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.to_path_buf(),
    }
}

/// Apply the container rename for `path`, if any, returning the final path.
pub async fn normalize(path: &Path) -> std::io::Result<PathBuf> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let target = CONTAINER_RENAMES
        .iter()
        .find(|(from, _)| ext.as_deref() == Some(*from))
        .map(|(_, to)| path.with_extension(to));

    match target {
        Some(target) => {
            tokio::fs::rename(path, &target).await?;
            Ok(target)
        }
        None => Ok(path.to_path_buf()),
    }
}

/// Move `artifact` into `work_dir` unless it already lives there.
///
/// Files the detector left elsewhere are taken over so that removing
/// `work_dir` removes them too.
pub async fn adopt(artifact: &Path, work_dir: &Path) -> std::io::Result<PathBuf> {
    if artifact.starts_with(work_dir) {
        return Ok(artifact.to_path_buf());
    }
    let name = artifact.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("artifact path {} has no file name", artifact.display()),
        )
    })?;
    let target = work_dir.join(name);

    // Rename fails across filesystems; copy then remove instead.
    if tokio::fs::rename(artifact, &target).await.is_err() {
        tokio::fs::copy(artifact, &target).await?;
        tokio::fs::remove_file(artifact).await?;
    }
    tracing::debug!(
        from = %artifact.display(),
        to = %target.display(),
        "Moved artifact into work directory",
    );
    Ok(target)
}

/// Resolve the file whose bytes become the processed image.
///
/// Uses the artifact, moved into `work_dir` and normalised, when the
/// detector produced one and falls back to the staged input otherwise.
pub async fn resolve(artifact: &Path, work_dir: &Path, staged: &Path) -> std::io::Result<PathBuf> {
    if tokio::fs::try_exists(artifact).await? {
        let adopted = adopt(artifact, work_dir).await?;
        normalize(&adopted).await
    } else {
        tracing::warn!(
            artifact = %artifact.display(),
            "Detector produced no artifact, using staged input",
        );
        Ok(staged.to_path_buf())
    }
}
