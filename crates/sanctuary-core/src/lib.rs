//! Sanctuary Core Library
//!
//! Shared functionality for the Sanctuary journal:
//! - Domain models for familiar interactions and ritual outcomes
//! - SQLite storage with connection pooling
//! - Insight Engine for derived emotional and ritual patterns
//! - Tool functions shared by the CLI and the MCP server

pub mod db;
pub mod error;
pub mod insights;
pub mod models;
pub mod tools;

pub use db::{Database, JournalFilter};
pub use error::{Error, Result};
pub use insights::{generate_insights, InsightEngine, InsightKind, OrderedMap, PatternInsight};
pub use models::{
    parse_timestamp, EmotionEntry, EmotionIntensity, Interaction, JournalEntry, JournalStats,
    RitualOutcome, TimestampInput,
};
