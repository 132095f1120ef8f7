//! Read-only handlers over inference records.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use serveiq_core::error::CoreError;
use serveiq_core::pagination::{
    clamp_limit, clamp_offset, DEFAULT_BATCH_LIMIT, MAX_BATCH_LIMIT, RECENT_FEED_LIMIT,
};
use serveiq_core::types::parse_record_id;
use serveiq_db::models::record::{Record, RecordListItem};

use crate::error::{AppError, AppResult};
use crate::query::{BatchParams, ItemParams};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub items: Vec<RecordListItem>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub item: Record,
}

/// A full record with its id, as shown on the dashboard feed.
#[derive(Debug, Serialize)]
pub struct FeedRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub record: Record,
}

/// GET /get-inference-count
pub async fn count(State(state): State<AppState>) -> AppResult<Json<CountResponse>> {
    let count = state.store.count().await?;
    Ok(Json(CountResponse { count }))
}

/// GET /get-inference-batch?start=&limit=
///
/// Lists records in upload order without their image payloads.
///
/// Out-of-range values are clamped rather than rejected: `limit` defaults to
/// 10 and is held to `1..=100`, and a negative `start` reads from 0.
pub async fn batch(
    State(state): State<AppState>,
    params: Result<Query<BatchParams>, QueryRejection>,
) -> AppResult<Json<BatchResponse>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let start = clamp_offset(params.start);
    let limit = clamp_limit(params.limit, DEFAULT_BATCH_LIMIT, MAX_BATCH_LIMIT);

    let items = state.store.find_many(start, limit).await?;
    Ok(Json(BatchResponse { items }))
}

/// GET /get-inference-item?id=
pub async fn item(
    State(state): State<AppState>,
    Query(params): Query<ItemParams>,
) -> AppResult<Json<ItemResponse>> {
    let raw = params
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No id provided".into()))?;

    let id = parse_record_id(&raw)
        .ok_or_else(|| CoreError::Validation(format!("Malformed id '{raw}'")))?;

    let item = state
        .store
        .find_one(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Item",
            id: raw,
        })?;
    Ok(Json(ItemResponse { item }))
}

/// GET /api/data
///
/// The most recent uploads, newest first, including processing results.
pub async fn recent(State(state): State<AppState>) -> AppResult<Json<Vec<FeedRecord>>> {
    let records = state.store.recent(RECENT_FEED_LIMIT).await?;
    let feed = records
        .into_iter()
        .map(|record| FeedRecord {
            id: record.id.to_string(),
            record,
        })
        .collect();
    Ok(Json(feed))
}
