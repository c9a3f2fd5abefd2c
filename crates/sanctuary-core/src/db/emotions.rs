//! JSON codec for the `emotions` column
//!
//! Emotions are stored as a JSON array of `{name, intensity}` objects in the
//! order they were logged. Decoding is lenient: rows written by older tools
//! may carry text that no longer parses, and those rows read back with no
//! emotions instead of failing the whole query. Within a readable list, an
//! entry whose intensity is out of range is dropped on its own.

use tracing::warn;

use crate::error::Result;
use crate::models::{EmotionEntry, EmotionIntensity};

/// Encode an emotion list for storage
pub fn encode_emotions(emotions: &[EmotionIntensity]) -> Result<String> {
    let entries: Vec<EmotionEntry> = emotions.iter().map(EmotionEntry::from).collect();
    Ok(serde_json::to_string(&entries)?)
}

/// Decode a stored emotion list; a malformed list decodes as empty
pub fn decode_emotions(raw: &str) -> Vec<EmotionIntensity> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let entries = match serde_json::from_str::<Vec<EmotionEntry>>(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed stored emotions");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| match EmotionIntensity::from_stored(entry.name, entry.intensity) {
            Ok(emotion) => Some(emotion),
            Err(e) => {
                warn!(error = %e, "Ignoring stored emotion");
                None
            }
        })
        .collect()
}
