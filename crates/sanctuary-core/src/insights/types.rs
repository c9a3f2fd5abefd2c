//! Core types for the Insight Engine

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Kinds of insight the engine can produce, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Most frequently experienced emotions
    EmotionFrequency,
    /// Overall ritual success rate
    RitualSuccessRate,
    /// Model associated with the widest emotional range
    ModelEmotionRange,
    /// Emotions most associated with successful rituals
    EmotionSuccessCorrelation,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::EmotionFrequency => "emotion_frequency",
            InsightKind::RitualSuccessRate => "ritual_success_rate",
            InsightKind::ModelEmotionRange => "model_emotion_range",
            InsightKind::EmotionSuccessCorrelation => "emotion_success_correlation",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emotion_frequency" => Ok(InsightKind::EmotionFrequency),
            "ritual_success_rate" => Ok(InsightKind::RitualSuccessRate),
            "model_emotion_range" => Ok(InsightKind::ModelEmotionRange),
            "emotion_success_correlation" => Ok(InsightKind::EmotionSuccessCorrelation),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// String-keyed map that remembers first-insertion order
///
/// Every count, grouping and metric in the engine goes through this type so
/// iteration (and therefore ranking tie-breaks and JSON output) follows the
/// order in which keys were first seen.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace; a replaced key keeps its original position
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<V: Default> OrderedMap<V> {
    /// Value for `key`, inserting `V::default()` at the end if absent
    pub fn entry_or_default(&mut self, key: &str) -> &mut V {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Emotion name -> occurrence count
pub type EmotionCounts = OrderedMap<usize>;

/// Model id -> emotion name -> occurrence count
pub type ModelEmotionCounts = OrderedMap<EmotionCounts>;

/// How often rituals carrying one emotion succeeded or failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuccessTally {
    pub successes: usize,
    pub failures: usize,
}

impl SuccessTally {
    pub fn new(successes: usize, failures: usize) -> Self {
        Self {
            successes,
            failures,
        }
    }

    pub fn record(&mut self, success: bool) {
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.successes + self.failures
    }

    /// Share of successes; 0.0 when nothing was recorded
    pub fn ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.successes as f64 / total as f64,
        }
    }
}

/// A derived, human-readable summary with supporting numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternInsight {
    pub description: String,
    pub metrics: OrderedMap<f64>,
    pub related_entities: Option<OrderedMap<Vec<String>>>,
}

impl PatternInsight {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            metrics: OrderedMap::new(),
            related_entities: None,
        }
    }

    pub fn with_metrics(mut self, metrics: OrderedMap<f64>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Attach a category of related entity ids (e.g., "emotions", "rituals")
    pub fn with_related(mut self, category: impl Into<String>, ids: Vec<String>) -> Self {
        self.related_entities
            .get_or_insert_with(OrderedMap::new)
            .insert(category, ids);
        self
    }

    pub fn related(&self, category: &str) -> Option<&[String]> {
        self.related_entities
            .as_ref()
            .and_then(|r| r.get(category))
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_kind_round_trip() {
        for kind in [
            InsightKind::EmotionFrequency,
            InsightKind::RitualSuccessRate,
            InsightKind::ModelEmotionRange,
            InsightKind::EmotionSuccessCorrelation,
        ] {
            assert_eq!(kind.as_str().parse::<InsightKind>().unwrap(), kind);
        }
        assert!("nonsense".parse::<InsightKind>().is_err());
    }

    #[test]
    fn test_ordered_map_keeps_first_seen_order() {
        let mut map: OrderedMap<usize> = OrderedMap::new();
        *map.entry_or_default("joy") += 1;
        *map.entry_or_default("awe") += 1;
        *map.entry_or_default("joy") += 1;

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["joy", "awe"]);
        assert_eq!(map.get("joy"), Some(&2));
        assert_eq!(map.get("fear"), None);
    }

    #[test]
    fn test_ordered_map_insert_replaces_in_place() {
        let mut map = OrderedMap::new();
        map.insert("a", 1.0);
        map.insert("b", 2.0);
        map.insert("a", 3.0);
        let entries: Vec<(String, f64)> = map.into_iter().collect();
        assert_eq!(entries, vec![("a".to_string(), 3.0), ("b".to_string(), 2.0)]);
    }

    #[test]
    fn test_ordered_map_serializes_in_order() {
        let mut map = OrderedMap::new();
        map.insert("zeta", 1);
        map.insert("alpha", 2);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"zeta":1,"alpha":2}"#
        );
    }

    #[test]
    fn test_success_tally_ratio() {
        assert_eq!(SuccessTally::default().ratio(), 0.0);
        assert_eq!(SuccessTally::new(3, 1).ratio(), 0.75);

        let mut tally = SuccessTally::default();
        tally.record(true);
        tally.record(false);
        assert_eq!(tally, SuccessTally::new(1, 1));
        assert_eq!(tally.total(), 2);
    }

    #[test]
    fn test_pattern_insight_related() {
        let insight = PatternInsight::new("test")
            .with_related("emotions", vec!["joy".into()])
            .with_related("models", vec!["claude".into(), "gpt".into()]);
        assert_eq!(insight.related("emotions"), Some(&["joy".to_string()][..]));
        assert_eq!(insight.related("models").map(|m| m.len()), Some(2));
        assert!(PatternInsight::new("bare").related("emotions").is_none());
    }
}
