//! Familiar interaction database operations

use rusqlite::params;
use tracing::debug;

use super::{decode_emotions, encode_emotions, format_timestamp, parse_stored_timestamp};
use super::{Database, JournalFilter};
use crate::error::Result;
use crate::models::Interaction;

impl Database {
    /// Append an interaction and return its row id
    pub fn add_interaction(&self, interaction: &Interaction) -> Result<i64> {
        interaction.validate()?;
        let emotions_json = encode_emotions(&interaction.emotions)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO interactions (timestamp, familiar_id, interaction_type, emotions, notes, model_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                format_timestamp(&interaction.timestamp),
                interaction.familiar_id,
                interaction.interaction_type,
                emotions_json,
                interaction.notes,
                interaction.model_id,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(id, familiar = %interaction.familiar_id, "Logged interaction");
        Ok(id)
    }

    /// Interactions matching `filter`, oldest row first (by id)
    pub fn get_interactions(&self, filter: &JournalFilter<'_>) -> Result<Vec<Interaction>> {
        let conn = self.conn()?;
        let built = filter.build("familiar_id");

        let sql = format!(
            r#"
            SELECT timestamp, familiar_id, interaction_type, emotions, notes, model_id
            FROM interactions
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
            let emotions: Option<String> = row.get(3)?;
            Ok(Interaction {
                timestamp: parse_stored_timestamp(0, &timestamp)?,
                familiar_id: row.get(1)?,
                interaction_type: row.get(2)?,
                emotions: decode_emotions(emotions.as_deref().unwrap_or_default()),
                notes: row.get(4)?,
                model_id: row.get(5)?,
            })
        })?;

        let interactions = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(count = interactions.len(), "Loaded interactions");
        Ok(interactions)
    }
}
