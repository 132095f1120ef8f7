//! Handler for `POST /upload`.
//!
//! Persists the uploaded image as a new unprocessed record and only then
//! announces it on the event bus.

use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use serveiq_core::types::normalize_location;
use serveiq_db::models::record::NewRecord;
use serveiq_events::NewFileEvent;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";
/// Optional multipart field carrying the location label.
const LOCATION_FIELD: &str = "location";

const NO_FILE_PART: &str = "No file part";
const NO_SELECTED_FILE: &str = "No selected file";

/// Successful ingest response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub location: String,
    pub document_id: String,
}

/// File part as received, before validation.
struct FilePart {
    file_name: Option<String>,
    bytes: Bytes,
}

/// POST /upload
///
/// Expects `multipart/form-data` with a `file` part and an optional
/// `location` text part.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Upload rejected before reading the body");
        AppError::BadRequest(NO_FILE_PART.into())
    })?;

    let mut file: Option<FilePart> = None;
    let mut location: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) if file.is_none() => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(FilePart { file_name, bytes });
            }
            Some(LOCATION_FIELD) => {
                location = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest(NO_FILE_PART.into()))?;
    let named = file.file_name.as_deref().is_some_and(|n| !n.trim().is_empty());
    if !named || file.bytes.is_empty() {
        return Err(AppError::BadRequest(NO_SELECTED_FILE.into()));
    }

    let location = normalize_location(location.as_deref());
    let input = NewRecord {
        location: location.clone(),
        image_data: BASE64.encode(&file.bytes),
        upload_time: chrono::Utc::now(),
    };

    let id = state.store.insert(input).await?;
    tracing::info!(
        record_id = %id,
        location = %location,
        bytes = file.bytes.len(),
        "Upload stored"
    );

    let receivers = state.event_bus.publish(NewFileEvent::new(location.clone(), id));
    tracing::debug!(record_id = %id, receivers, "new_file published");

    Ok(Json(UploadResponse {
        message: "File uploaded successfully",
        location,
        document_id: id.to_string(),
    }))
}

/// Map a multipart read failure, keeping the body-limit case distinct.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(err.body_text())
    }
}
