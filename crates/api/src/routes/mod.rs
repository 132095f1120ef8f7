pub mod health;
pub mod inference;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the public route tree.
///
/// Routes sit at the root so existing clients keep working:
///
/// ```text
/// /health                   service and store health
/// /ws                       notification subscription (WebSocket)
/// /upload                   ingest (POST, multipart)
/// /get-inference-count      record count
/// /get-inference-batch      paginated listing (?start=&limit=)
/// /get-inference-item       single record (?id=)
/// /api/data                 recent records feed
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .route("/ws", get(ws::ws_handler))
        .merge(inference::router())
}
