#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use serveiq_api::config::ServerConfig;
use serveiq_api::router::build_app_router;
use serveiq_api::state::AppState;
use serveiq_api::ws::WsManager;
use serveiq_db::store::{MemoryRecordStore, RecordStore};
use serveiq_events::EventBus;

pub const BOUNDARY: &str = "serveiq-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
    }
}

/// The router plus handles on the pieces tests want to inspect.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryRecordStore>,
    pub event_bus: Arc<EventBus>,
    pub ws_manager: Arc<WsManager>,
}

/// Build the full application over an in-memory store.
pub fn build_test_app() -> TestApp {
    build_test_app_with_config(test_config())
}

pub fn build_test_app_with_config(config: ServerConfig) -> TestApp {
    let store = Arc::new(MemoryRecordStore::new());
    let (router, event_bus, ws_manager) = build_router(store.clone(), config);
    TestApp {
        router,
        store,
        event_bus,
        ws_manager,
    }
}

/// Build the full application over any store, e.g. a failing double.
pub fn build_router(
    store: Arc<dyn RecordStore>,
    config: ServerConfig,
) -> (Router, Arc<EventBus>, Arc<WsManager>) {
    let event_bus = Arc::new(EventBus::default());
    let ws_manager = Arc::new(WsManager::new());
    let state = AppState {
        store,
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
    };
    (build_app_router(state, &config), event_bus, ws_manager)
}

/// One part of a multipart form.
pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

/// Encode parts as a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// `POST /upload` with the given parts.
pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Upload `bytes` as `photo.jpg` with an optional location.
pub fn image_upload(bytes: &[u8], location: Option<&str>) -> Request<Body> {
    let mut parts = vec![Part::File {
        name: "file",
        file_name: "photo.jpg",
        bytes,
    }];
    if let Some(value) = location {
        parts.push(Part::Text {
            name: "location",
            value,
        });
    }
    upload_request(&parts)
}

/// Send a request and return the status and parsed JSON body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// `GET uri` and return the status and parsed JSON body.
pub async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}
