//! Domain models for Sanctuary journal entries

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// =============================================================================
// Timestamps
// =============================================================================

/// The accepted shapes of an entry timestamp before it is resolved to an instant
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampInput {
    /// Seconds since the Unix epoch, UTC
    EpochSeconds(f64),
    /// ISO-8601 text (offset optional; naive values are read as UTC)
    Iso8601(String),
    /// An already-typed instant
    Instant(DateTime<Utc>),
}

impl From<DateTime<Utc>> for TimestampInput {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Instant(dt)
    }
}

impl From<f64> for TimestampInput {
    fn from(secs: f64) -> Self {
        Self::EpochSeconds(secs)
    }
}

impl From<i64> for TimestampInput {
    fn from(secs: i64) -> Self {
        Self::EpochSeconds(secs as f64)
    }
}

impl From<&str> for TimestampInput {
    fn from(s: &str) -> Self {
        Self::Iso8601(s.to_string())
    }
}

impl From<String> for TimestampInput {
    fn from(s: String) -> Self {
        Self::Iso8601(s)
    }
}

impl TryFrom<&serde_json::Value> for TimestampInput {
    type Error = Error;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Self::EpochSeconds)
                .ok_or_else(|| Error::validation(format!("Timestamp out of range: {}", n))),
            serde_json::Value::String(s) => Ok(Self::Iso8601(s.clone())),
            other => Err(Error::validation(format!(
                "Timestamp must be epoch seconds or an ISO-8601 string, got: {}",
                other
            ))),
        }
    }
}

/// Resolve any accepted timestamp shape to a UTC instant
///
/// The result is truncated to whole microseconds, the precision the store
/// keeps, so a resolved instant always survives a write and read unchanged.
pub fn parse_timestamp(input: impl Into<TimestampInput>) -> Result<DateTime<Utc>> {
    let dt = match input.into() {
        TimestampInput::Instant(dt) => dt,
        TimestampInput::EpochSeconds(secs) => from_epoch_seconds(secs)?,
        TimestampInput::Iso8601(s) => parse_iso8601(&s)?,
    };
    Ok(dt.trunc_subsecs(6))
}

fn from_epoch_seconds(secs: f64) -> Result<DateTime<Utc>> {
    if !secs.is_finite() || secs.abs() > i64::MAX as f64 {
        return Err(Error::validation(format!("Invalid epoch timestamp: {}", secs)));
    }

    // Stored timestamps carry microseconds, so round there
    let mut whole = secs.floor() as i64;
    let mut micros = ((secs - secs.floor()) * 1_000_000.0).round() as u32;
    if micros >= 1_000_000 {
        whole += 1;
        micros = 0;
    }

    DateTime::from_timestamp(whole, micros * 1_000)
        .ok_or_else(|| Error::validation(format!("Epoch timestamp out of range: {}", secs)))
}

fn parse_iso8601(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(Error::validation(format!("Unrecognized ISO-8601 timestamp: {:?}", raw)))
}

fn require_text(field: &str, value: impl Into<String>) -> Result<String> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{} is required", field)));
    }
    Ok(value)
}

// =============================================================================
// Emotions
// =============================================================================

/// Unvalidated wire form of an emotion, as sent by clients and stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EmotionEntry {
    /// Name of the emotion (e.g., "joy", "gratitude")
    #[schemars(description = "Name of the emotion, e.g. joy, sadness, gratitude")]
    pub name: String,

    /// Strength of the emotion from 0 (absent) to 1 (overwhelming)
    #[schemars(description = "Intensity on a 0-1 scale")]
    pub intensity: f64,
}

/// A named emotion with a normalized intensity in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EmotionEntry")]
pub struct EmotionIntensity {
    name: String,
    intensity: f64,
}

impl EmotionIntensity {
    pub fn new(name: impl Into<String>, intensity: f64) -> Result<Self> {
        Self::from_stored(require_text("emotion name", name)?, intensity)
    }

    /// Rebuild an emotion read back from storage
    ///
    /// Only the intensity range is checked; older rows may carry blank names.
    pub fn from_stored(name: impl Into<String>, intensity: f64) -> Result<Self> {
        let name = name.into();
        if !(0.0..=1.0).contains(&intensity) {
            return Err(Error::validation(format!(
                "Intensity for '{}' must be between 0 and 1, got {}",
                name, intensity
            )));
        }
        Ok(Self { name, intensity })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }
}

impl TryFrom<EmotionEntry> for EmotionIntensity {
    type Error = Error;

    fn try_from(entry: EmotionEntry) -> Result<Self> {
        Self::new(entry.name, entry.intensity)
    }
}

impl From<&EmotionIntensity> for EmotionEntry {
    fn from(emotion: &EmotionIntensity) -> Self {
        Self {
            name: emotion.name.clone(),
            intensity: emotion.intensity,
        }
    }
}

/// Validate a batch of wire-form emotions, failing on the first bad one
pub fn validate_emotions(entries: Vec<EmotionEntry>) -> Result<Vec<EmotionIntensity>> {
    entries.into_iter().map(EmotionIntensity::try_from).collect()
}

// =============================================================================
// Journal entries
// =============================================================================

/// Fields shared by every kind of journal entry
pub trait JournalEntry {
    fn timestamp(&self) -> DateTime<Utc>;
    fn emotions(&self) -> &[EmotionIntensity];
    fn model_id(&self) -> Option<&str>;
}

/// A logged encounter with a familiar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub timestamp: DateTime<Utc>,
    /// Which familiar was encountered (e.g., "owl", "gardener")
    pub familiar_id: String,
    /// Kind of encounter (e.g., "vision", "conversation")
    pub interaction_type: String,
    pub emotions: Vec<EmotionIntensity>,
    pub notes: Option<String>,
    /// The LLM or agent that recorded the entry
    pub model_id: Option<String>,
}

impl Interaction {
    pub fn new(
        timestamp: impl Into<TimestampInput>,
        familiar_id: impl Into<String>,
        interaction_type: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            timestamp: parse_timestamp(timestamp)?,
            familiar_id: require_text("familiar_id", familiar_id)?,
            interaction_type: require_text("interaction_type", interaction_type)?,
            emotions: Vec::new(),
            notes: None,
            model_id: None,
        })
    }

    pub fn with_emotions(mut self, emotions: Vec<EmotionIntensity>) -> Self {
        self.emotions = emotions;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Re-check required fields (public fields may have been edited after `new`)
    pub fn validate(&self) -> Result<()> {
        require_text("familiar_id", self.familiar_id.as_str())?;
        require_text("interaction_type", self.interaction_type.as_str())?;
        Ok(())
    }
}

impl JournalEntry for Interaction {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn emotions(&self) -> &[EmotionIntensity] {
        &self.emotions
    }

    fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }
}

/// The result of a performed ritual
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RitualOutcome {
    pub timestamp: DateTime<Utc>,
    pub ritual_name: String,
    /// The practitioner's judgment of whether the ritual met its intention
    pub success: bool,
    pub outcome_description: Option<String>,
    pub emotions: Vec<EmotionIntensity>,
    pub notes: Option<String>,
    pub model_id: Option<String>,
}

impl RitualOutcome {
    pub fn new(
        timestamp: impl Into<TimestampInput>,
        ritual_name: impl Into<String>,
        success: bool,
    ) -> Result<Self> {
        Ok(Self {
            timestamp: parse_timestamp(timestamp)?,
            ritual_name: require_text("ritual_name", ritual_name)?,
            success,
            outcome_description: None,
            emotions: Vec::new(),
            notes: None,
            model_id: None,
        })
    }

    pub fn with_emotions(mut self, emotions: Vec<EmotionIntensity>) -> Self {
        self.emotions = emotions;
        self
    }

    pub fn with_outcome_description(mut self, description: impl Into<String>) -> Self {
        self.outcome_description = Some(description.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_text("ritual_name", self.ritual_name.as_str())?;
        Ok(())
    }
}

impl JournalEntry for RitualOutcome {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn emotions(&self) -> &[EmotionIntensity] {
        &self.emotions
    }

    fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }
}

/// Entry counts and time span of the journal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JournalStats {
    pub interactions: i64,
    pub rituals: i64,
    pub first_entry: Option<DateTime<Utc>>,
    pub last_entry: Option<DateTime<Utc>>,
}
