//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use sanctuary_core::db::Database;

/// Open the journal database, creating the schema if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    tracing::debug!(path = %db_path.display(), "Opening journal");
    Database::new(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let stats = db.journal_stats().context("Failed to read journal")?;

    if stats.interactions + stats.rituals > 0 {
        println!(
            "   Existing journal kept ({} interactions, {} rituals)",
            stats.interactions, stats.rituals
        );
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Log an entry: sanctuary log ritual --name \"Moon Rite\" --success -e joy=0.8");
    println!("  2. Connect an MCP client: sanctuary serve");

    Ok(())
}
