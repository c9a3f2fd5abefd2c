//! Insight Engine - derived summaries over journal entries
//!
//! The engine runs a fixed list of rules over a snapshot of interactions and
//! ritual outcomes. Each rule either produces a [`PatternInsight`] or stays
//! quiet when the data doesn't support it.
//!
//! ## Built-in rules (in output order)
//!
//! - **Emotion Frequency** - Most frequently experienced emotions
//! - **Ritual Success Rate** - Overall success rate; always present
//! - **Model Emotion Range** - Model with the widest emotional range
//! - **Emotion Success Correlation** - Emotions present when rituals succeed
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sanctuary_core::insights::generate_insights;
//!
//! let interactions = db.get_interactions(&JournalFilter::new())?;
//! let rituals = db.get_rituals(&JournalFilter::new())?;
//! for insight in generate_insights(&interactions, &rituals) {
//!     println!("{}", insight.description);
//! }
//! ```

pub mod engine;
pub mod patterns;
pub mod rules;
pub mod types;

pub use engine::{generate_insights, InsightEngine, InsightRule, JournalSnapshot};
pub use patterns::{
    aggregate_emotion_counts, compute_success_rate, emotion_counts_by_model,
    ritual_success_by_emotion, top_n, UNKNOWN_MODEL,
};
pub use rules::{
    EmotionFrequencyRule, EmotionSuccessCorrelationRule, ModelEmotionRangeRule,
    RitualSuccessRateRule,
};
pub use types::{
    EmotionCounts, InsightKind, ModelEmotionCounts, OrderedMap, PatternInsight, SuccessTally,
};
