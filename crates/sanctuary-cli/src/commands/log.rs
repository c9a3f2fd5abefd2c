//! Journal logging commands

use anyhow::{Context, Result};
use sanctuary_core::db::Database;
use sanctuary_core::tools::{self, LogInteractionParams, LogRitualParams};

use super::print_json;

pub fn cmd_log_interaction(db: &Database, params: LogInteractionParams, json: bool) -> Result<()> {
    let familiar = params.familiar_id.clone();
    let logged = tools::log_interaction(db, params).context("Failed to log interaction")?;

    if json {
        return print_json(&logged);
    }

    println!("✅ Logged interaction #{} with {}", logged.id, familiar);
    Ok(())
}

pub fn cmd_log_ritual(db: &Database, params: LogRitualParams, json: bool) -> Result<()> {
    let name = params.ritual_name.clone();
    let success = params.success;
    let logged = tools::log_ritual(db, params).context("Failed to log ritual")?;

    if json {
        return print_json(&logged);
    }

    let verdict = if success { "succeeded" } else { "failed" };
    println!("✅ Logged ritual #{}: {} ({})", logged.id, name, verdict);
    Ok(())
}
