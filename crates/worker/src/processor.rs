//! The per-record processing pipeline.
//!
//! Stages run in order and short-circuit on the first failure:
//!
//! ```text
//! received -> staged -> inferred -> relocated -> updated
//! ```
//!
//! The [`WorkArea`] created in the `staged` stage is dropped on every exit
//! path, which removes the staged file and the detector's working directory.

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serveiq_core::detection::ProcessingResult;
use serveiq_core::types::{parse_record_id, RecordId};
use serveiq_db::models::record::Record;
use serveiq_db::store::{RecordStore, StoreError, UpdateOutcome};
use serveiq_detect::{artifact, DetectError, DetectRequest, Detector};
use serveiq_events::NewFileEvent;

use crate::staging::WorkArea;

/// Why a record was abandoned. Every variant is terminal for that record.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Malformed document id '{0}'")]
    InvalidId(String),

    #[error("Failed to fetch record: {0}")]
    Fetch(#[source] StoreError),

    #[error("Record {0} not found")]
    NotFound(RecordId),

    #[error("Record {0} has no image payload")]
    MissingPayload(RecordId),

    #[error("Record {0} is already processed")]
    AlreadyProcessed(RecordId),

    #[error("Failed to decode payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Failed to stage payload: {0}")]
    Stage(#[source] std::io::Error),

    #[error("Detection failed: {0}")]
    Detect(#[from] DetectError),

    #[error("Failed to read detector artifact: {0}")]
    Artifact(#[source] std::io::Error),

    #[error("Failed to update record: {0}")]
    Update(#[source] StoreError),
}

impl ProcessError {
    /// Pipeline stage the failure belongs to, for logging.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidId(_)
            | Self::Fetch(_)
            | Self::NotFound(_)
            | Self::MissingPayload(_)
            | Self::AlreadyProcessed(_) => "received",
            Self::Decode(_) | Self::Stage(_) => "staged",
            Self::Detect(_) => "inferred",
            Self::Artifact(_) => "relocated",
            Self::Update(_) => "updated",
        }
    }
}

/// Runs the pipeline for one notification at a time.
pub struct Processor<D> {
    store: Arc<dyn RecordStore>,
    detector: D,
    staging_dir: PathBuf,
}

impl<D: Detector> Processor<D> {
    pub fn new(store: Arc<dyn RecordStore>, detector: D, staging_dir: PathBuf) -> Self {
        Self {
            store,
            detector,
            staging_dir,
        }
    }

    /// Process the record named by `event` to completion.
    ///
    /// Returns the final result that was written onto the record.
    pub async fn process(&self, event: &NewFileEvent) -> Result<ProcessingResult, ProcessError> {
        let record = self.receive(event).await?;
        let payload = BASE64.decode(record.image_data.as_bytes())?;

        let area = WorkArea::stage(&self.staging_dir, record.id, &payload)
            .await
            .map_err(ProcessError::Stage)?;

        let request = DetectRequest {
            source: area.staged().to_path_buf(),
            output_dir: area.work_dir().to_path_buf(),
        };
        let detection = self.detector.detect(&request).await?;
        tracing::info!(
            record_id = %record.id,
            objects = detection.objects.len(),
            "Detection complete"
        );

        let final_path = artifact::resolve(&detection.artifact, area.work_dir(), area.staged())
            .await
            .map_err(ProcessError::Artifact)?;
        let artifact_bytes = tokio::fs::read(&final_path)
            .await
            .map_err(ProcessError::Artifact)?;

        let result = ProcessingResult::new(
            BASE64.encode(artifact_bytes),
            detection.objects,
            chrono::Utc::now(),
        );

        match self
            .store
            .update_one(record.id, &result)
            .await
            .map_err(ProcessError::Update)?
        {
            UpdateOutcome::Applied => Ok(result),
            UpdateOutcome::Skipped => Err(ProcessError::AlreadyProcessed(record.id)),
        }
    }

    /// Resolve the event to an unprocessed record with a payload.
    async fn receive(&self, event: &NewFileEvent) -> Result<Record, ProcessError> {
        let id = parse_record_id(&event.document_id)
            .ok_or_else(|| ProcessError::InvalidId(event.document_id.clone()))?;

        let record = self
            .store
            .find_one(id)
            .await
            .map_err(ProcessError::Fetch)?
            .ok_or(ProcessError::NotFound(id))?;

        if record.processed {
            return Err(ProcessError::AlreadyProcessed(id));
        }
        if record.image_data.is_empty() {
            return Err(ProcessError::MissingPayload(id));
        }
        Ok(record)
    }
}
