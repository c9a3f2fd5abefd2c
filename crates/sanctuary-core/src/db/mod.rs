//! Database access layer with connection pooling and schema setup
//!
//! This module is organized by domain:
//! - `interactions` - Familiar interaction inserts and queries
//! - `rituals` - Ritual outcome inserts and queries
//! - `emotions` - JSON codec for the stored emotion column
//! - `journal_filter` - Shared WHERE-clause builder for range queries

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{parse_timestamp, JournalStats};

mod emotions;
mod interactions;
mod journal_filter;
mod rituals;

pub use emotions::{decode_emotions, encode_emotions};
pub use journal_filter::{FilterResult, JournalFilter};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// File name used when no database path is given
pub const DEFAULT_DB_NAME: &str = "sanctuary.db";

/// Format an instant the way it is stored in the `timestamp` columns
///
/// Fixed width with microseconds and a `Z` suffix, so string comparison in
/// SQL matches chronological order.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// SQL function that rewrites any stored timestamp shape in the canonical format
///
/// Rows written by older tools carry naive or offset ISO text, so range
/// bounds and MIN/MAX compare `journal_instant(timestamp)` rather than the raw
/// column. Unparseable values map to NULL and never match a bound.
pub const INSTANT_FN: &str = "journal_instant";

fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        INSTANT_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let raw = ctx.get::<Option<String>>(0).ok().flatten();
            Ok(raw.and_then(|s| parse_timestamp(s).ok().map(|dt| format_timestamp(&dt))))
        },
    )
}

/// Parse a stored timestamp column, reporting failures as a column conversion error
pub(crate) fn parse_stored_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    parse_timestamp(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: PathBuf,
}

impl Database {
    /// Open (creating if needed) the journal at `path` and ensure the schema exists
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let manager = SqliteConnectionManager::file(&db_path).with_init(|conn| {
            // Concurrent writers wait on each other instead of failing fast
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            register_functions(conn)
        });
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self { pool, db_path };
        db.initialize()?;

        Ok(db)
    }

    /// Open the journal at `path`, or `sanctuary.db` in the working directory
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::new(p),
            None => Self::open_default(),
        }
    }

    /// Open `sanctuary.db` in the current working directory
    pub fn open_default() -> Result<Self> {
        let path = std::env::current_dir()?.join(DEFAULT_DB_NAME);
        Self::new(path)
    }

    /// Create a throw-away database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "sanctuary_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(path)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Create the journal tables if they are missing
    ///
    /// Every statement is conditional, so this can run any number of times
    /// (and from several processes) without touching existing rows.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers, appends from several
            -- processes interleave safely
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Familiar interactions
            CREATE TABLE IF NOT EXISTS interactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                familiar_id TEXT NOT NULL,
                interaction_type TEXT NOT NULL,
                emotions TEXT NOT NULL,                    -- JSON array of {name, intensity}
                notes TEXT,
                model_id TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_interactions_timestamp ON interactions(timestamp);
            CREATE INDEX IF NOT EXISTS idx_interactions_model ON interactions(model_id);

            -- Ritual outcomes
            CREATE TABLE IF NOT EXISTS rituals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                ritual_name TEXT NOT NULL,
                success INTEGER NOT NULL,                  -- 0 or 1
                outcome_description TEXT,
                emotions TEXT NOT NULL,                    -- JSON array of {name, intensity}
                notes TEXT,
                model_id TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_rituals_timestamp ON rituals(timestamp);
            CREATE INDEX IF NOT EXISTS idx_rituals_model ON rituals(model_id);
            CREATE INDEX IF NOT EXISTS idx_rituals_name ON rituals(ritual_name);
            "#,
        )?;

        info!(path = %self.db_path.display(), "Journal schema ready");
        Ok(())
    }

    /// Entry counts and the overall time span of the journal
    pub fn journal_stats(&self) -> Result<JournalStats> {
        let conn = self.conn()?;

        let (interactions, rituals, first, last): (i64, i64, Option<String>, Option<String>) = conn
            .query_row(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM interactions),
                    (SELECT COUNT(*) FROM rituals),
                    (SELECT MIN(journal_instant(timestamp)) FROM (
                        SELECT timestamp FROM interactions
                        UNION ALL SELECT timestamp FROM rituals
                    )),
                    (SELECT MAX(journal_instant(timestamp)) FROM (
                        SELECT timestamp FROM interactions
                        UNION ALL SELECT timestamp FROM rituals
                    ))
                "#,
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        let first_entry = first.map(|s| parse_stored_timestamp(2, &s)).transpose()?;
        let last_entry = last.map(|s| parse_stored_timestamp(3, &s)).transpose()?;

        debug!(interactions, rituals, "Computed journal stats");
        Ok(JournalStats {
            interactions,
            rituals,
            first_entry,
            last_entry,
        })
    }
}
