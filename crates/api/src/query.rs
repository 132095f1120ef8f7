//! Query parameter types for the inference endpoints.

use serde::Deserialize;

/// `?start=&limit=` for the batch listing.
///
/// Values are clamped in the handler via `clamp_offset` / `clamp_limit`.
#[derive(Debug, Default, Deserialize)]
pub struct BatchParams {
    pub start: Option<i64>,
    pub limit: Option<i64>,
}

/// `?id=` for the single-record fetch.
#[derive(Debug, Default, Deserialize)]
pub struct ItemParams {
    pub id: Option<String>,
}
