//! Detection results attached to a record once it has been processed.
//!
//! A detector reports findings as `(label, confidence)` pairs with the
//! confidence in `0.0..=1.0`. Records store the confidence as an integer
//! percentage and carry a per-label tally alongside the raw list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Per-label count of detected objects.
pub type Summary = BTreeMap<String, u32>;

/// One finding in model-output order.
///
/// Serialized as a two-element array `[label, confidence]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, u8)", into = "(String, u8)")]
pub struct DetectedObject {
    pub label: String,
    /// Confidence as an integer percentage (`0..=100`).
    pub confidence: u8,
}

impl DetectedObject {
    /// Build a finding from a raw model confidence in `0.0..=1.0`.
    pub fn from_raw(label: impl Into<String>, raw_confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence: confidence_percent(raw_confidence),
        }
    }
}

impl From<(String, u8)> for DetectedObject {
    fn from((label, confidence): (String, u8)) -> Self {
        Self { label, confidence }
    }
}

impl From<DetectedObject> for (String, u8) {
    fn from(obj: DetectedObject) -> Self {
        (obj.label, obj.confidence)
    }
}

/// Convert a raw confidence to a rounded integer percentage.
///
/// Non-finite values map to 0; the result is clamped to `0..=100`.
pub fn confidence_percent(raw: f32) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    (raw * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Count how many times each label occurs.
pub fn tally(objects: &[DetectedObject]) -> Summary {
    let mut summary = Summary::new();
    for obj in objects {
        *summary.entry(obj.label.clone()).or_insert(0) += 1;
    }
    summary
}

/// The group of fields written onto a record by the worker.
///
/// These are only ever written together, so a record either has all of
/// them or none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Base64-encoded annotated artifact produced by the detector.
    #[serde(rename = "image")]
    pub processed_image: String,
    pub detected_objects: Vec<DetectedObject>,
    pub summary: Summary,
    #[serde(rename = "timestamp")]
    pub processed_timestamp: Timestamp,
}

impl ProcessingResult {
    /// Assemble a result from ordered findings, deriving the summary.
    pub fn new(
        processed_image: String,
        detected_objects: Vec<DetectedObject>,
        processed_timestamp: Timestamp,
    ) -> Self {
        let summary = tally(&detected_objects);
        Self {
            processed_image,
            detected_objects,
            summary,
            processed_timestamp,
        }
    }
}
