//! Tool implementations for Sanctuary
//!
//! These are the operations exposed to LLM clients over MCP. They are used by:
//! 1. The MCP server (`sanctuary-server`)
//! 2. The CLI, which calls the same functions for its log/query commands
//!
//! Logging tools append to the journal; everything else is read-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{Database, JournalFilter};
use crate::error::Result;
use crate::insights::{
    emotion_counts_by_model, generate_insights, ModelEmotionCounts, PatternInsight,
};
use crate::models::{
    parse_timestamp, validate_emotions, EmotionEntry, Interaction, RitualOutcome, TimestampInput,
};

// =============================================================================
// Timestamp Resolution (shared utility)
// =============================================================================

/// Resolve an optional JSON timestamp (epoch seconds or ISO-8601 text)
pub fn resolve_timestamp_opt(value: Option<&serde_json::Value>) -> Result<Option<DateTime<Utc>>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => Ok(Some(parse_timestamp(TimestampInput::try_from(v)?)?)),
    }
}

/// Resolve an entry timestamp, defaulting to now
fn resolve_entry_timestamp(value: Option<&serde_json::Value>) -> Result<DateTime<Utc>> {
    Ok(resolve_timestamp_opt(value)?.unwrap_or_else(Utc::now))
}

/// Identifier assigned to a newly logged entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct LoggedEntry {
    pub id: i64,
}

// =============================================================================
// log_interaction
// =============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct LogInteractionParams {
    /// Which familiar was encountered
    #[schemars(description = "Identifier of the familiar encountered, e.g. owl, gardener")]
    pub familiar_id: String,

    /// Kind of encounter
    #[schemars(description = "Type of interaction, e.g. conversation, vision, dream")]
    pub interaction_type: String,

    #[schemars(description = "Emotions felt during the interaction, each with a 0-1 intensity")]
    pub emotions: Option<Vec<EmotionEntry>>,

    #[schemars(description = "Free-form notes about the interaction")]
    pub notes: Option<String>,

    #[schemars(description = "The model or agent recording this entry")]
    pub model_id: Option<String>,

    /// Epoch seconds or ISO-8601; defaults to now
    #[schemars(
        description = "When it happened: epoch seconds or an ISO-8601 string. Defaults to now"
    )]
    pub timestamp: Option<serde_json::Value>,
}

pub fn log_interaction(db: &Database, params: LogInteractionParams) -> Result<LoggedEntry> {
    let timestamp = resolve_entry_timestamp(params.timestamp.as_ref())?;
    let emotions = validate_emotions(params.emotions.unwrap_or_default())?;

    let mut interaction = Interaction::new(timestamp, params.familiar_id, params.interaction_type)?
        .with_emotions(emotions);
    interaction.notes = params.notes;
    interaction.model_id = params.model_id;

    let id = db.add_interaction(&interaction)?;
    Ok(LoggedEntry { id })
}

// =============================================================================
// log_ritual
// =============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct LogRitualParams {
    #[schemars(description = "Name of the ritual performed, e.g. Moon Rite")]
    pub ritual_name: String,

    #[schemars(description = "Whether the ritual met its intention")]
    pub success: bool,

    #[schemars(description = "Emotions felt during the ritual, each with a 0-1 intensity")]
    pub emotions: Option<Vec<EmotionEntry>>,

    #[schemars(description = "What happened as a result of the ritual")]
    pub outcome_description: Option<String>,

    #[schemars(description = "Free-form notes about the ritual")]
    pub notes: Option<String>,

    #[schemars(description = "The model or agent recording this entry")]
    pub model_id: Option<String>,

    #[schemars(
        description = "When it happened: epoch seconds or an ISO-8601 string. Defaults to now"
    )]
    pub timestamp: Option<serde_json::Value>,
}

pub fn log_ritual(db: &Database, params: LogRitualParams) -> Result<LoggedEntry> {
    let timestamp = resolve_entry_timestamp(params.timestamp.as_ref())?;
    let emotions = validate_emotions(params.emotions.unwrap_or_default())?;

    let mut outcome =
        RitualOutcome::new(timestamp, params.ritual_name, params.success)?.with_emotions(emotions);
    outcome.outcome_description = params.outcome_description;
    outcome.notes = params.notes;
    outcome.model_id = params.model_id;

    let id = db.add_ritual(&outcome)?;
    Ok(LoggedEntry { id })
}

// =============================================================================
// get_interactions / get_rituals
// =============================================================================

/// Shared filter for the entry listing tools
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct EntryFilterParams {
    #[schemars(description = "Only entries recorded by this model")]
    pub model_id: Option<String>,

    /// Inclusive lower bound
    #[schemars(description = "Earliest timestamp (inclusive): epoch seconds or ISO-8601")]
    pub start: Option<serde_json::Value>,

    /// Inclusive upper bound
    #[schemars(description = "Latest timestamp (inclusive): epoch seconds or ISO-8601")]
    pub end: Option<serde_json::Value>,
}

pub fn get_interactions(db: &Database, params: EntryFilterParams) -> Result<Vec<Interaction>> {
    let filter = JournalFilter::new()
        .model_id(params.model_id.as_deref())
        .start(resolve_timestamp_opt(params.start.as_ref())?)
        .end(resolve_timestamp_opt(params.end.as_ref())?);

    db.get_interactions(&filter)
}

pub fn get_rituals(db: &Database, params: EntryFilterParams) -> Result<Vec<RitualOutcome>> {
    let filter = JournalFilter::new()
        .model_id(params.model_id.as_deref())
        .start(resolve_timestamp_opt(params.start.as_ref())?)
        .end(resolve_timestamp_opt(params.end.as_ref())?);

    db.get_rituals(&filter)
}

// =============================================================================
// get_insights
// =============================================================================

/// Insights over the whole journal
pub fn get_insights(db: &Database) -> Result<Vec<PatternInsight>> {
    let all = JournalFilter::new();
    let interactions = db.get_interactions(&all)?;
    let rituals = db.get_rituals(&all)?;

    Ok(generate_insights(&interactions, &rituals))
}

// =============================================================================
// query_emotions_by_model
// =============================================================================

/// Emotion counts per model across the whole journal
pub fn query_emotions_by_model(db: &Database) -> Result<ModelEmotionCounts> {
    let all = JournalFilter::new();
    let interactions = db.get_interactions(&all)?;
    let rituals = db.get_rituals(&all)?;

    Ok(emotion_counts_by_model(&interactions, &rituals))
}

// =============================================================================
// query_ritual_insights
// =============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct RitualInsightsParams {
    #[schemars(description = "Exact name of the ritual to analyze")]
    pub ritual_name: String,

    #[schemars(description = "Only outcomes recorded by this model")]
    pub model_id: Option<String>,
}

/// Insights over the outcomes of one ritual; empty when none match
pub fn query_ritual_insights(
    db: &Database,
    params: RitualInsightsParams,
) -> Result<Vec<PatternInsight>> {
    let filter = JournalFilter::new()
        .model_id(params.model_id.as_deref())
        .subject(Some(params.ritual_name.as_str()));
    let rituals = db.get_rituals(&filter)?;

    if rituals.is_empty() {
        return Ok(Vec::new());
    }

    Ok(generate_insights(&[], &rituals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup_test_db() -> Database {
        Database::in_memory().expect("Failed to create test database")
    }

    fn emotion(name: &str, intensity: f64) -> EmotionEntry {
        EmotionEntry {
            name: name.to_string(),
            intensity,
        }
    }

    fn log_moon_rite(db: &Database, success: bool, model: Option<&str>, at: &str) -> i64 {
        log_ritual(
            db,
            LogRitualParams {
                ritual_name: "Moon Rite".into(),
                success,
                emotions: Some(vec![emotion("joy", 0.9)]),
                model_id: model.map(str::to_string),
                timestamp: Some(json!(at)),
                ..Default::default()
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_log_interaction_defaults_to_now() {
        let db = setup_test_db();
        let before = Utc::now();

        let logged = log_interaction(
            &db,
            LogInteractionParams {
                familiar_id: "owl".into(),
                interaction_type: "vision".into(),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(logged.id > 0);

        let entries = get_interactions(&db, EntryFilterParams::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].timestamp >= before - chrono::Duration::seconds(1));
        assert!(entries[0].emotions.is_empty());
    }

    #[test]
    fn test_log_interaction_epoch_timestamp() {
        let db = setup_test_db();
        log_interaction(
            &db,
            LogInteractionParams {
                familiar_id: "gardener".into(),
                interaction_type: "conversation".into(),
                emotions: Some(vec![emotion("calm", 0.3)]),
                notes: Some("tended the roses".into()),
                model_id: Some("claude".into()),
                timestamp: Some(json!(1_700_000_000)),
            },
        )
        .unwrap();

        let entries = get_interactions(&db, EntryFilterParams::default()).unwrap();
        assert_eq!(entries[0].timestamp.timestamp(), 1_700_000_000);
        assert_eq!(entries[0].emotions[0].name(), "calm");
        assert_eq!(entries[0].notes.as_deref(), Some("tended the roses"));
    }

    #[test]
    fn test_log_rejects_bad_input() {
        let db = setup_test_db();

        let bad_intensity = log_interaction(
            &db,
            LogInteractionParams {
                familiar_id: "owl".into(),
                interaction_type: "vision".into(),
                emotions: Some(vec![emotion("joy", 1.01)]),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(bad_intensity.is_validation());

        let bad_timestamp = log_ritual(
            &db,
            LogRitualParams {
                ritual_name: "Moon Rite".into(),
                timestamp: Some(json!(true)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(bad_timestamp.is_validation());

        let missing_name = log_ritual(&db, LogRitualParams::default()).unwrap_err();
        assert!(missing_name.is_validation());

        // Nothing was written
        assert_eq!(db.journal_stats().unwrap().interactions, 0);
        assert_eq!(db.journal_stats().unwrap().rituals, 0);
    }

    #[test]
    fn test_params_deserialize_from_json() {
        let params: LogRitualParams = serde_json::from_value(json!({
            "ritual_name": "Moon Rite",
            "success": true,
            "emotions": [{"name": "joy", "intensity": 1.0}],
            "timestamp": "2024-06-21T04:00:00Z"
        }))
        .unwrap();
        assert_eq!(params.ritual_name, "Moon Rite");
        assert_eq!(params.emotions.unwrap().len(), 1);
    }

    #[test]
    fn test_get_rituals_filters() {
        let db = setup_test_db();
        log_moon_rite(&db, true, Some("claude"), "2024-01-01T00:00:00Z");
        log_moon_rite(&db, false, Some("gpt"), "2024-02-01T00:00:00Z");
        log_moon_rite(&db, true, Some("claude"), "2024-03-01T00:00:00Z");

        let claude = get_rituals(
            &db,
            EntryFilterParams {
                model_id: Some("claude".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(claude.len(), 2);

        let window = get_rituals(
            &db,
            EntryFilterParams {
                start: Some(json!("2024-02-01T00:00:00Z")),
                end: Some(json!("2024-03-01T00:00:00Z")),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(window.len(), 2);
        assert!(!window[0].success);
    }

    #[test]
    fn test_get_insights_empty_journal() {
        let db = setup_test_db();
        let insights = get_insights(&db).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].metrics.get("ritual_count"), Some(&0.0));
    }

    #[test]
    fn test_query_emotions_by_model() {
        let db = setup_test_db();
        log_moon_rite(&db, true, None, "2024-01-01T00:00:00Z");
        log_moon_rite(&db, true, Some("claude"), "2024-01-02T00:00:00Z");

        let by_model = query_emotions_by_model(&db).unwrap();
        let keys: Vec<&str> = by_model.keys().collect();
        assert_eq!(keys, vec!["unknown", "claude"]);
        assert_eq!(by_model.get("claude").unwrap().get("joy"), Some(&1));
    }

    #[test]
    fn test_query_ritual_insights() {
        let db = setup_test_db();
        log_moon_rite(&db, true, Some("claude"), "2024-01-01T00:00:00Z");
        log_moon_rite(&db, false, Some("gpt"), "2024-01-02T00:00:00Z");
        log_ritual(
            &db,
            LogRitualParams {
                ritual_name: "Sun Rite".into(),
                success: true,
                ..Default::default()
            },
        )
        .unwrap();

        let insights = query_ritual_insights(
            &db,
            RitualInsightsParams {
                ritual_name: "Moon Rite".into(),
                model_id: None,
            },
        )
        .unwrap();
        let rate = insights
            .iter()
            .find(|i| i.metrics.contains_key("success_rate"))
            .unwrap();
        assert_eq!(rate.metrics.get("ritual_count"), Some(&2.0));
        assert_eq!(rate.metrics.get("success_rate"), Some(&0.5));

        let claude_only = query_ritual_insights(
            &db,
            RitualInsightsParams {
                ritual_name: "Moon Rite".into(),
                model_id: Some("claude".into()),
            },
        )
        .unwrap();
        let rate = claude_only
            .iter()
            .find(|i| i.metrics.contains_key("success_rate"))
            .unwrap();
        assert_eq!(rate.metrics.get("success_rate"), Some(&1.0));
    }

    #[test]
    fn test_query_ritual_insights_no_match() {
        let db = setup_test_db();
        log_moon_rite(&db, true, None, "2024-01-01T00:00:00Z");

        let insights = query_ritual_insights(
            &db,
            RitualInsightsParams {
                ritual_name: "Star Rite".into(),
                model_id: None,
            },
        )
        .unwrap();
        assert!(insights.is_empty());

        // A blank name matches nothing rather than failing
        let blank = query_ritual_insights(&db, RitualInsightsParams::default()).unwrap();
        assert!(blank.is_empty());
    }
}
