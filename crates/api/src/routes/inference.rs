//! Route definitions for ingest and inference queries.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{inference, upload};
use crate::state::AppState;

/// ```text
/// POST /upload                 -> upload
/// GET  /get-inference-count    -> count
/// GET  /get-inference-batch    -> batch
/// GET  /get-inference-item     -> item
/// GET  /api/data               -> recent
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload::upload))
        .route("/get-inference-count", get(inference::count))
        .route("/get-inference-batch", get(inference::batch))
        .route("/get-inference-item", get(inference::item))
        .route("/api/data", get(inference::recent))
}
