//! Integration tests for `POST /upload`.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serveiq_core::detection::ProcessingResult;
use serveiq_core::types::RecordId;
use serveiq_db::models::record::{NewRecord, Record, RecordListItem};
use serveiq_db::store::{RecordStore, StoreError, UpdateOutcome};

use common::{build_router, build_test_app, build_test_app_with_config, get, image_upload, send, test_config, Part};

const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0 not really a jpeg";

// ---------------------------------------------------------------------------
// Test: a valid upload is stored unprocessed and announced once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_stores_record_then_notifies() {
    let app = build_test_app();
    let mut events = app.event_bus.subscribe();

    let (status, json) = send(&app.router, image_upload(JPEG, Some("North Gate"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "File uploaded successfully");
    assert_eq!(json["location"], "North Gate");
    let document_id = json["document_id"].as_str().unwrap().to_string();

    let event = events.try_recv().expect("one new_file event");
    assert_eq!(event.document_id, document_id);
    assert_eq!(event.location, "North Gate");
    assert!(events.try_recv().is_err());

    let (status, json) = get(
        &app.router,
        &format!("/get-inference-item?id={document_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["item"]["processed"], false);
    assert_eq!(json["item"]["imageData"], BASE64.encode(JPEG));
    assert!(json["item"].get("image").is_none());
    assert!(json["item"].get("_id").is_none());
}

// ---------------------------------------------------------------------------
// Test: location defaults to "Unknown"
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_without_location_uses_default() {
    let app = build_test_app();

    let (status, json) = send(&app.router, image_upload(JPEG, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["location"], "Unknown");

    let (_, json) = send(&app.router, image_upload(JPEG, Some("   "))).await;
    assert_eq!(json["location"], "Unknown");
}

// ---------------------------------------------------------------------------
// Test: missing file part is a client error with no side effects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_without_file_part_is_rejected() {
    let app = build_test_app();
    let mut events = app.event_bus.subscribe();

    let request = common::upload_request(&[Part::Text {
        name: "location",
        value: "Dock",
    }]);
    let (status, json) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "No file part");
    assert_eq!(app.store.count().await.unwrap(), 0);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn upload_with_empty_file_name_is_rejected() {
    let app = build_test_app();

    let request = common::upload_request(&[Part::File {
        name: "file",
        file_name: "",
        bytes: JPEG,
    }]);
    let (status, json) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No selected file");
    assert_eq!(app.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn upload_with_empty_payload_is_rejected() {
    let app = build_test_app();

    let (status, json) = send(&app.router, image_upload(b"", Some("Yard"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No selected file");
    assert_eq!(app.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn non_multipart_upload_is_rejected() {
    let app = build_test_app();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{}"))
        .unwrap();
    let (status, json) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No file part");
}

// ---------------------------------------------------------------------------
// Test: bodies over the configured limit are refused
// ---------------------------------------------------------------------------

#[tokio::test]
async fn oversized_upload_returns_413() {
    let mut config = test_config();
    config.max_upload_bytes = 1024;
    let app = build_test_app_with_config(config);
    let mut events = app.event_bus.subscribe();

    let big = vec![0xAB; 8 * 1024];
    let (status, json) = send(&app.router, image_upload(&big, None)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.store.count().await.unwrap(), 0);
    assert!(events.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: a failed write is a server error and nothing is announced
// ---------------------------------------------------------------------------

/// Store whose every operation fails.
struct UnavailableStore;

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn insert(&self, _input: NewRecord) -> Result<RecordId, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_one(&self, _id: RecordId) -> Result<Option<Record>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_many(&self, _start: i64, _limit: i64) -> Result<Vec<RecordListItem>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn update_one(
        &self,
        _id: RecordId,
        _result: &ProcessingResult,
    ) -> Result<UpdateOutcome, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn recent(&self, _limit: i64) -> Result<Vec<Record>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

#[tokio::test]
async fn storage_failure_returns_500_without_notification() {
    let (router, event_bus, _) = build_router(Arc::new(UnavailableStore), test_config());
    let mut events = event_bus.subscribe();

    let (status, json) = send(&router, image_upload(JPEG, Some("Pier"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "STORAGE_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("connection refused"));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn health_reports_degraded_store() {
    let (router, _, _) = build_router(Arc::new(UnavailableStore), test_config());

    let (status, json) = get(&router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["store_healthy"], false);
}
