//! Inference record models.
//!
//! [`RecordRow`] mirrors the `inference_records` table. [`Record`] is the
//! shape handed to callers: the post-processing columns are folded into a
//! single optional [`ProcessingResult`] so a half-written result can never
//! be observed through this type.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use serveiq_core::detection::{DetectedObject, ProcessingResult, Summary};
use serveiq_core::types::{RecordId, Timestamp};

/// A row from the `inference_records` table.
#[derive(Debug, Clone, FromRow)]
pub struct RecordRow {
    pub id: RecordId,
    pub location: String,
    pub image_data: String,
    pub upload_time: Timestamp,
    pub processed: bool,
    pub processed_image: Option<String>,
    pub detected_objects: Option<Json<Vec<DetectedObject>>>,
    pub summary: Option<Json<Summary>>,
    pub processed_timestamp: Option<Timestamp>,
}

/// A persisted upload and, once the worker is done, its detection result.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    #[serde(skip)]
    pub id: RecordId,
    pub location: String,
    /// Base64-encoded upload payload.
    #[serde(rename = "imageData")]
    pub image_data: String,
    pub upload_time: Timestamp,
    pub processed: bool,
    #[serde(flatten)]
    pub result: Option<ProcessingResult>,
}

impl Record {
    /// Build an unprocessed record.
    pub fn unprocessed(id: RecordId, input: NewRecord) -> Self {
        Self {
            id,
            location: input.location,
            image_data: input.image_data,
            upload_time: input.upload_time,
            processed: false,
            result: None,
        }
    }
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        let result = match (
            row.processed,
            row.processed_image,
            row.detected_objects,
            row.summary,
            row.processed_timestamp,
        ) {
            (true, Some(image), Some(Json(objects)), Some(Json(summary)), Some(ts)) => {
                Some(ProcessingResult {
                    processed_image: image,
                    detected_objects: objects,
                    summary,
                    processed_timestamp: ts,
                })
            }
            _ => None,
        };

        Self {
            id: row.id,
            location: row.location,
            image_data: row.image_data,
            upload_time: row.upload_time,
            processed: result.is_some(),
            result,
        }
    }
}

/// Input for creating a record.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub location: String,
    /// Base64-encoded upload payload.
    pub image_data: String,
    pub upload_time: Timestamp,
}

/// Projection used by batch listings. Never carries the payload.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct RecordListItem {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub location: String,
    pub upload_time: Timestamp,
}

impl From<&Record> for RecordListItem {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            location: record.location.clone(),
            upload_time: record.upload_time,
        }
    }
}
