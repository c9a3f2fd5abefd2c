//! Aggregations over journal snapshots
//!
//! Pure functions: they read the slices they are given and never touch the
//! database.

use crate::models::{Interaction, JournalEntry, RitualOutcome};

use super::types::{EmotionCounts, ModelEmotionCounts, OrderedMap, SuccessTally};

/// Key used for entries logged without a model id
pub const UNKNOWN_MODEL: &str = "unknown";

fn all_entries<'a>(
    interactions: &'a [Interaction],
    rituals: &'a [RitualOutcome],
) -> impl Iterator<Item = &'a dyn JournalEntry> {
    interactions
        .iter()
        .map(|i| i as &dyn JournalEntry)
        .chain(rituals.iter().map(|r| r as &dyn JournalEntry))
}

/// Count every emotion occurrence across both entry kinds
pub fn aggregate_emotion_counts(
    interactions: &[Interaction],
    rituals: &[RitualOutcome],
) -> EmotionCounts {
    let mut counts = EmotionCounts::new();
    for entry in all_entries(interactions, rituals) {
        for emotion in entry.emotions() {
            *counts.entry_or_default(emotion.name()) += 1;
        }
    }
    counts
}

/// Fraction of rituals marked successful; 0.0 when there are none
pub fn compute_success_rate(rituals: &[RitualOutcome]) -> f64 {
    if rituals.is_empty() {
        return 0.0;
    }
    let successes = rituals.iter().filter(|r| r.success).count();
    successes as f64 / rituals.len() as f64
}

/// Emotion counts grouped by the model that logged each entry
///
/// Entries without a model id (or with an empty one) are grouped under
/// [`UNKNOWN_MODEL`]. A model only appears once one of its entries
/// contributes an emotion.
pub fn emotion_counts_by_model(
    interactions: &[Interaction],
    rituals: &[RitualOutcome],
) -> ModelEmotionCounts {
    let mut by_model = ModelEmotionCounts::new();
    for entry in all_entries(interactions, rituals) {
        let model = entry
            .model_id()
            .filter(|m| !m.is_empty())
            .unwrap_or(UNKNOWN_MODEL);
        for emotion in entry.emotions() {
            *by_model
                .entry_or_default(model)
                .entry_or_default(emotion.name()) += 1;
        }
    }
    by_model
}

/// Per emotion, how many rituals carrying it succeeded and failed
pub fn ritual_success_by_emotion(rituals: &[RitualOutcome]) -> OrderedMap<SuccessTally> {
    let mut stats = OrderedMap::<SuccessTally>::new();
    for ritual in rituals {
        for emotion in &ritual.emotions {
            stats
                .entry_or_default(emotion.name())
                .record(ritual.success);
        }
    }
    stats
}

/// The `n` highest-valued keys; equal values keep first-seen order
pub fn top_n<V: Copy + PartialOrd>(map: &OrderedMap<V>, n: usize) -> Vec<(String, V)> {
    let mut ranked: Vec<(String, V)> = map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    // sort_by is stable, which is what keeps ties in first-seen order
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}
