//! Wire format for notifications.
//!
//! Frames are JSON text messages shaped `{"type": "<kind>", "data": {...}}`.

use serde::{Deserialize, Serialize};
use serveiq_core::types::RecordId;

/// Event name for freshly ingested records.
pub const NEW_FILE: &str = "new_file";

/// Announces that a record has been durably stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFileEvent {
    pub location: String,
    /// Display form of the record id.
    pub document_id: String,
}

impl NewFileEvent {
    pub fn new(location: impl Into<String>, id: RecordId) -> Self {
        Self {
            location: location.into(),
            document_id: id.to_string(),
        }
    }
}

/// All messages carried by the notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChannelMessage {
    #[serde(rename = "new_file")]
    NewFile(NewFileEvent),
}

impl ChannelMessage {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> String {
        // Serializing a struct of plain strings cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<NewFileEvent> for ChannelMessage {
    fn from(event: NewFileEvent) -> Self {
        Self::NewFile(event)
    }
}

/// Parse a text frame into a typed message.
///
/// Returns `Err` for malformed JSON or unknown `type` values.
/// Callers should log and continue.
pub fn parse_message(text: &str) -> Result<ChannelMessage, serde_json::Error> {
    serde_json::from_str(text)
}
