//! Journal filter builder for constructing dynamic SQL queries
//!
//! Interactions and rituals share the same filter shape (model, time range,
//! subject), so both query paths build their WHERE clause here.

use chrono::{DateTime, Duration, SubsecRound, Utc};

use super::{format_timestamp, INSTANT_FN};

/// Stored instants are whole microseconds, so a finer lower bound rounds up
fn ceil_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    let floor = dt.trunc_subsecs(6);
    if floor == dt {
        dt
    } else {
        floor + Duration::microseconds(1)
    }
}

/// Builder for journal range queries
///
/// All conditions are conjunctive. Time bounds are inclusive on both ends and
/// compare instants, whatever ISO shape a row was stored in.
#[derive(Debug, Default, Clone)]
pub struct JournalFilter<'query> {
    pub model_id: Option<&'query str>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Exact familiar id (interactions) or ritual name (rituals)
    pub subject: Option<&'query str>,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword (empty if no conditions)
    pub where_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl<'query> JournalFilter<'query> {
    /// Create a new filter builder (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set model_id filter
    pub fn model_id(mut self, model_id: Option<&'query str>) -> Self {
        self.model_id = model_id;
        self
    }

    /// Set inclusive lower time bound
    pub fn start(mut self, start: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self
    }

    /// Set inclusive upper time bound
    pub fn end(mut self, end: Option<DateTime<Utc>>) -> Self {
        self.end = end;
        self
    }

    /// Set subject filter
    pub fn subject(mut self, subject: Option<&'query str>) -> Self {
        self.subject = subject;
        self
    }

    /// Build the filter components; `subject_column` names the table's subject column
    pub fn build(&self, subject_column: &'static str) -> FilterResult {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(model_id) = self.model_id {
            conditions.push("model_id = ?".to_string());
            params.push(Box::new(model_id.to_string()));
        }

        if let Some(start) = self.start {
            conditions.push(format!("{}(timestamp) >= ?", INSTANT_FN));
            params.push(Box::new(format_timestamp(&ceil_micros(start))));
        }

        if let Some(end) = self.end {
            conditions.push(format!("{}(timestamp) <= ?", INSTANT_FN));
            params.push(Box::new(format_timestamp(&end.trunc_subsecs(6))));
        }

        if let Some(subject) = self.subject {
            conditions.push(format!("{} = ?", subject_column));
            params.push(Box::new(subject.to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        FilterResult {
            where_clause,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_filter() {
        let result = JournalFilter::new().build("familiar_id");
        assert!(result.where_clause.is_empty());
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_model_filter() {
        let result = JournalFilter::new()
            .model_id(Some("claude"))
            .build("familiar_id");
        assert_eq!(result.where_clause, "WHERE model_id = ?");
        assert_eq!(result.params.len(), 1);
    }

    #[test]
    fn test_all_filters_conjunctive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let result = JournalFilter::new()
            .model_id(Some("gpt"))
            .start(Some(start))
            .end(Some(end))
            .subject(Some("Moon Rite"))
            .build("ritual_name");

        assert_eq!(
            result.where_clause,
            "WHERE model_id = ? AND journal_instant(timestamp) >= ? \
             AND journal_instant(timestamp) <= ? AND ritual_name = ?"
        );
        assert_eq!(result.params.len(), 4);
    }

    #[test]
    fn test_range_only() {
        let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let result = JournalFilter::new().end(Some(end)).build("familiar_id");
        assert_eq!(result.where_clause, "WHERE journal_instant(timestamp) <= ?");
    }

    #[test]
    fn test_ceil_micros() {
        let whole = Utc.with_ymd_and_hms(2024, 3, 5, 21, 15, 0).unwrap();
        assert_eq!(ceil_micros(whole), whole);

        let fine = whole + Duration::nanoseconds(500);
        assert_eq!(ceil_micros(fine), whole + Duration::microseconds(1));
    }
}
