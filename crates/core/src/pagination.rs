//! Pagination defaults and clamping for listing endpoints.

/// Default page size for batch listings.
pub const DEFAULT_BATCH_LIMIT: i64 = 10;

/// Maximum page size for batch listings.
pub const MAX_BATCH_LIMIT: i64 = 100;

/// Number of records returned by the recent-inferences feed.
pub const RECENT_FEED_LIMIT: i64 = 20;

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
