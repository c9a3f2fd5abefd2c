//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db)
//! - `log` - Log interactions and ritual outcomes
//! - `journal` - List interactions and rituals
//! - `insights` - Insight and per-model emotion reports
//! - `serve` - MCP server command
//! - `status` - Database status

pub mod core;
pub mod insights;
pub mod journal;
pub mod log;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use core::*;
pub use insights::*;
pub use journal::*;
pub use log::*;
pub use serve::*;
pub use status::*;

use anyhow::{Context, Result};
use serde::Serialize;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")?;
    println!("{}", json);
    Ok(())
}
