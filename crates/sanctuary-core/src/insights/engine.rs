//! Insight Engine - runs insight rules over a journal snapshot in a fixed order

use crate::models::{Interaction, RitualOutcome};

use super::rules::{
    EmotionFrequencyRule, EmotionSuccessCorrelationRule, ModelEmotionRangeRule,
    RitualSuccessRateRule,
};
use super::types::{InsightKind, PatternInsight};

/// The entries an analysis runs over, already loaded by the caller
#[derive(Debug, Clone, Copy)]
pub struct JournalSnapshot<'a> {
    pub interactions: &'a [Interaction],
    pub rituals: &'a [RitualOutcome],
}

impl<'a> JournalSnapshot<'a> {
    pub fn new(interactions: &'a [Interaction], rituals: &'a [RitualOutcome]) -> Self {
        Self {
            interactions,
            rituals,
        }
    }
}

/// A single insight rule
pub trait InsightRule: Send + Sync {
    /// Which insight this rule produces
    fn kind(&self) -> InsightKind;

    /// Produce the insight, or `None` when the snapshot doesn't support it
    fn evaluate(&self, snapshot: &JournalSnapshot<'_>) -> Option<PatternInsight>;
}

/// Runs registered rules in registration order
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in rules in their fixed priority order
    pub fn new() -> Self {
        let mut engine = Self { rules: vec![] };

        engine.register(Box::new(EmotionFrequencyRule));
        engine.register(Box::new(RitualSuccessRateRule));
        engine.register(Box::new(ModelEmotionRangeRule));
        engine.register(Box::new(EmotionSuccessCorrelationRule));

        engine
    }

    /// Register a rule; it runs after every rule registered before it
    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Evaluate every rule; output order is registration order, never re-sorted
    pub fn analyze(&self, snapshot: &JournalSnapshot<'_>) -> Vec<PatternInsight> {
        let mut insights = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            match rule.evaluate(snapshot) {
                Some(insight) => {
                    tracing::debug!(kind = rule.kind().as_str(), "Insight produced");
                    insights.push(insight);
                }
                None => {
                    tracing::debug!(kind = rule.kind().as_str(), "Insight skipped");
                }
            }
        }

        insights
    }

    /// Kinds of the registered rules, in order
    pub fn kinds(&self) -> Vec<InsightKind> {
        self.rules.iter().map(|r| r.kind()).collect()
    }
}

/// Generate the standard insights for a set of entries
pub fn generate_insights(
    interactions: &[Interaction],
    rituals: &[RitualOutcome],
) -> Vec<PatternInsight> {
    InsightEngine::new().analyze(&JournalSnapshot::new(interactions, rituals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmotionIntensity;

    struct FixedRule;

    impl InsightRule for FixedRule {
        fn kind(&self) -> InsightKind {
            InsightKind::EmotionFrequency
        }

        fn evaluate(&self, _snapshot: &JournalSnapshot<'_>) -> Option<PatternInsight> {
            Some(PatternInsight::new("fixed"))
        }
    }

    fn emotion(name: &str) -> EmotionIntensity {
        EmotionIntensity::new(name, 0.8).unwrap()
    }

    fn ritual(name: &str, success: bool, emotions: &[&str], model: Option<&str>) -> RitualOutcome {
        let mut r = RitualOutcome::new("2024-06-21T04:00:00Z", name, success)
            .unwrap()
            .with_emotions(emotions.iter().map(|e| emotion(e)).collect());
        r.model_id = model.map(str::to_string);
        r
    }

    fn interaction(emotions: &[&str], model: Option<&str>) -> Interaction {
        let mut i = Interaction::new("2024-06-20T22:00:00Z", "owl", "dream")
            .unwrap()
            .with_emotions(emotions.iter().map(|e| emotion(e)).collect());
        i.model_id = model.map(str::to_string);
        i
    }

    #[test]
    fn test_engine_creation() {
        let engine = InsightEngine::new();
        assert_eq!(
            engine.kinds(),
            vec![
                InsightKind::EmotionFrequency,
                InsightKind::RitualSuccessRate,
                InsightKind::ModelEmotionRange,
                InsightKind::EmotionSuccessCorrelation,
            ]
        );
    }

    #[test]
    fn test_register_appends() {
        let mut engine = InsightEngine { rules: vec![] };
        engine.register(Box::new(FixedRule));
        let out = engine.analyze(&JournalSnapshot::new(&[], &[]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].description, "fixed");
    }

    #[test]
    fn test_empty_journal_yields_success_rate_only() {
        let insights = generate_insights(&[], &[]);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].metrics.get("success_rate"), Some(&0.0));
        assert_eq!(insights[0].metrics.get("ritual_count"), Some(&0.0));
        assert_eq!(insights[0].related("rituals"), Some(&[][..]));
    }

    #[test]
    fn test_single_moon_rite() {
        let rituals = [ritual("Moon Rite", true, &["joy"], None)];
        let insights = generate_insights(&[], &rituals);

        // frequency, success rate, and the joy success correlation; no model insight
        assert_eq!(insights.len(), 3);

        let frequency = &insights[0];
        assert_eq!(frequency.metrics.get("joy"), Some(&1.0));
        assert_eq!(frequency.related("emotions"), Some(&["joy".to_string()][..]));

        let rate = &insights[1];
        assert_eq!(rate.metrics.get("success_rate"), Some(&1.0));
        assert_eq!(rate.metrics.get("ritual_count"), Some(&1.0));
        assert_eq!(rate.related("rituals"), Some(&["Moon Rite".to_string()][..]));
        assert_eq!(
            rate.description,
            "Overall ritual success rate is 100.0% across 1 rituals."
        );

        assert!(insights.iter().all(|i| i.related("models").is_none()));
        assert_eq!(insights[2].metrics.get("joy"), Some(&1.0));
    }

    #[test]
    fn test_full_pipeline_order() {
        let interactions = [
            interaction(&["joy", "awe"], Some("claude")),
            interaction(&["fear"], Some("gpt")),
        ];
        let rituals = [
            ritual("Moon Rite", true, &["joy"], Some("claude")),
            ritual("Fire Rite", false, &["fear"], None),
        ];

        let insights = generate_insights(&interactions, &rituals);
        assert_eq!(insights.len(), 4);
        assert!(insights[0].description.starts_with("The most frequently"));
        assert!(insights[1].description.starts_with("Overall ritual success rate"));
        assert!(insights[2].description.starts_with("Model 'claude'"));
        assert!(insights[3]
            .description
            .starts_with("Emotions most correlated with successful rituals"));
    }
}
