//! Ritual outcome database operations

use rusqlite::params;
use tracing::debug;

use super::{decode_emotions, encode_emotions, format_timestamp, parse_stored_timestamp};
use super::{Database, JournalFilter};
use crate::error::Result;
use crate::models::RitualOutcome;

impl Database {
    /// Append a ritual outcome and return its row id
    pub fn add_ritual(&self, outcome: &RitualOutcome) -> Result<i64> {
        outcome.validate()?;
        let emotions_json = encode_emotions(&outcome.emotions)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO rituals (timestamp, ritual_name, success, outcome_description, emotions, notes, model_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                format_timestamp(&outcome.timestamp),
                outcome.ritual_name,
                if outcome.success { 1 } else { 0 },
                outcome.outcome_description,
                emotions_json,
                outcome.notes,
                outcome.model_id,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(id, ritual = %outcome.ritual_name, success = outcome.success, "Logged ritual");
        Ok(id)
    }

    /// Ritual outcomes matching `filter`, oldest row first (by id)
    ///
    /// The filter's subject matches `ritual_name` exactly.
    pub fn get_rituals(&self, filter: &JournalFilter<'_>) -> Result<Vec<RitualOutcome>> {
        let conn = self.conn()?;
        let built = filter.build("ritual_name");

        let sql = format!(
            r#"
            SELECT timestamp, ritual_name, success, outcome_description, emotions, notes, model_id
            FROM rituals
            {}
            ORDER BY id ASC
            "#,
            built.where_clause
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            built.params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_refs.as_slice(), |row| {
            let timestamp: String = row.get(0)?;
            let success: i64 = row.get(2)?;
            let emotions: Option<String> = row.get(4)?;
            Ok(RitualOutcome {
                timestamp: parse_stored_timestamp(0, &timestamp)?,
                ritual_name: row.get(1)?,
                success: success != 0,
                outcome_description: row.get(3)?,
                emotions: decode_emotions(emotions.as_deref().unwrap_or_default()),
                notes: row.get(5)?,
                model_id: row.get(6)?,
            })
        })?;

        let rituals = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(count = rituals.len(), "Loaded rituals");
        Ok(rituals)
    }
}
