/// Record identifiers are store-assigned UUIDs.
pub type RecordId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Location label used when the client does not supply one.
pub const DEFAULT_LOCATION: &str = "Unknown";

/// Parse the display form of a record identifier.
///
/// Returns `None` for anything that is not a well-formed UUID so callers
/// can reject malformed ids without touching the store.
pub fn parse_record_id(raw: &str) -> Option<RecordId> {
    uuid::Uuid::parse_str(raw.trim()).ok()
}

/// Normalise a client-supplied location label.
///
/// Blank or missing labels fall back to [`DEFAULT_LOCATION`].
pub fn normalize_location(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => DEFAULT_LOCATION.to_string(),
    }
}
