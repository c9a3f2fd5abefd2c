//! Built-in insight rules

use super::engine::{InsightRule, JournalSnapshot};
use super::patterns::{
    aggregate_emotion_counts, compute_success_rate, emotion_counts_by_model,
    ritual_success_by_emotion, top_n,
};
use super::types::{InsightKind, OrderedMap, PatternInsight};

const TOP_EMOTIONS: usize = 3;

/// Most frequently experienced emotions across all entries
pub struct EmotionFrequencyRule;

impl InsightRule for EmotionFrequencyRule {
    fn kind(&self) -> InsightKind {
        InsightKind::EmotionFrequency
    }

    fn evaluate(&self, snapshot: &JournalSnapshot<'_>) -> Option<PatternInsight> {
        let counts = aggregate_emotion_counts(snapshot.interactions, snapshot.rituals);
        if counts.is_empty() {
            return None;
        }

        let top = top_n(&counts, TOP_EMOTIONS);
        let listed: Vec<String> = top
            .iter()
            .map(|(name, count)| format!("{} ({})", name, count))
            .collect();

        let metrics: OrderedMap<f64> = counts
            .iter()
            .map(|(name, count)| (name.to_string(), *count as f64))
            .collect();

        Some(
            PatternInsight::new(format!(
                "The most frequently experienced emotions across all interactions and rituals are: {}.",
                listed.join(", ")
            ))
            .with_metrics(metrics)
            .with_related("emotions", top.into_iter().map(|(name, _)| name).collect()),
        )
    }
}

/// Overall ritual success rate; always produced, even for an empty journal
pub struct RitualSuccessRateRule;

impl InsightRule for RitualSuccessRateRule {
    fn kind(&self) -> InsightKind {
        InsightKind::RitualSuccessRate
    }

    fn evaluate(&self, snapshot: &JournalSnapshot<'_>) -> Option<PatternInsight> {
        let rate = compute_success_rate(snapshot.rituals);
        let count = snapshot.rituals.len();

        let mut metrics = OrderedMap::new();
        metrics.insert("success_rate", rate);
        metrics.insert("ritual_count", count as f64);

        Some(
            PatternInsight::new(format!(
                "Overall ritual success rate is {:.1}% across {} rituals.",
                rate * 100.0,
                count
            ))
            .with_metrics(metrics)
            .with_related(
                "rituals",
                snapshot
                    .rituals
                    .iter()
                    .map(|r| r.ritual_name.clone())
                    .collect(),
            ),
        )
    }
}

/// The model whose entries span the most distinct emotions
///
/// Only meaningful when more than one model is present.
pub struct ModelEmotionRangeRule;

impl InsightRule for ModelEmotionRangeRule {
    fn kind(&self) -> InsightKind {
        InsightKind::ModelEmotionRange
    }

    fn evaluate(&self, snapshot: &JournalSnapshot<'_>) -> Option<PatternInsight> {
        let by_model = emotion_counts_by_model(snapshot.interactions, snapshot.rituals);
        if by_model.len() <= 1 {
            return None;
        }

        // First model to reach the maximum wins ties
        let mut best: Option<(&str, usize)> = None;
        for (model, counts) in by_model.iter() {
            if best.map_or(true, |(_, variety)| counts.len() > variety) {
                best = Some((model, counts.len()));
            }
        }
        let (best_model, variety) = best?;

        let metrics: OrderedMap<f64> = by_model
            .iter()
            .map(|(model, counts)| (model.to_string(), counts.len() as f64))
            .collect();

        Some(
            PatternInsight::new(format!(
                "Model '{}' exhibited the broadest range of emotions ({} unique emotions).",
                best_model, variety
            ))
            .with_metrics(metrics)
            .with_related("models", by_model.keys().map(str::to_string).collect()),
        )
    }
}

/// Emotions most often present when rituals succeed
pub struct EmotionSuccessCorrelationRule;

impl InsightRule for EmotionSuccessCorrelationRule {
    fn kind(&self) -> InsightKind {
        InsightKind::EmotionSuccessCorrelation
    }

    fn evaluate(&self, snapshot: &JournalSnapshot<'_>) -> Option<PatternInsight> {
        let stats = ritual_success_by_emotion(snapshot.rituals);
        if stats.is_empty() {
            return None;
        }

        let ratios: OrderedMap<f64> = stats
            .iter()
            .map(|(name, tally)| (name.to_string(), tally.ratio()))
            .collect();

        let top = top_n(&ratios, TOP_EMOTIONS);
        let listed: Vec<String> = top
            .iter()
            .map(|(name, ratio)| format!("{} ({:.0}%)", name, ratio * 100.0))
            .collect();

        Some(
            PatternInsight::new(format!(
                "Emotions most correlated with successful rituals: {}.",
                listed.join(", ")
            ))
            .with_related("emotions", top.into_iter().map(|(name, _)| name).collect())
            .with_metrics(ratios),
        )
    }
}
