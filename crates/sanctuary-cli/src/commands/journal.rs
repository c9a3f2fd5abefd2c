//! Journal listing commands

use anyhow::Result;
use sanctuary_core::db::Database;
use sanctuary_core::models::EmotionIntensity;
use sanctuary_core::tools::{self, EntryFilterParams};

use super::{print_json, truncate};

/// Compact "joy 0.80, awe 0.50" rendering of an emotion list
pub fn format_emotions(emotions: &[EmotionIntensity]) -> String {
    if emotions.is_empty() {
        return "-".to_string();
    }
    emotions
        .iter()
        .map(|e| format!("{} {:.2}", e.name(), e.intensity()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn cmd_interactions(db: &Database, filter: EntryFilterParams, json: bool) -> Result<()> {
    let interactions = tools::get_interactions(db, filter)?;

    if json {
        return print_json(&interactions);
    }

    if interactions.is_empty() {
        println!("No interactions found. Log one with:");
        println!("  sanctuary log interaction --familiar owl --kind vision");
        return Ok(());
    }

    println!();
    println!("🦉 Interactions ({})", interactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for i in &interactions {
        println!(
            "   {} │ {:<12} │ {:<12} │ {}",
            i.timestamp.format("%Y-%m-%d %H:%M"),
            truncate(&i.familiar_id, 12),
            truncate(&i.interaction_type, 12),
            format_emotions(&i.emotions)
        );
        if let Some(notes) = &i.notes {
            println!("     {}", truncate(notes, 60));
        }
    }

    Ok(())
}

pub fn cmd_rituals(db: &Database, filter: EntryFilterParams, json: bool) -> Result<()> {
    let rituals = tools::get_rituals(db, filter)?;

    if json {
        return print_json(&rituals);
    }

    if rituals.is_empty() {
        println!("No rituals found. Log one with:");
        println!("  sanctuary log ritual --name \"Moon Rite\" --success");
        return Ok(());
    }

    println!();
    println!("🌙 Rituals ({})", rituals.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for r in &rituals {
        let verdict = if r.success {
            "\x1b[32m✓\x1b[0m" // Green for success
        } else {
            "\x1b[31m✗\x1b[0m" // Red for failure
        };

        println!(
            "   {} │ {} │ {:<20} │ {}",
            r.timestamp.format("%Y-%m-%d %H:%M"),
            verdict,
            truncate(&r.ritual_name, 20),
            format_emotions(&r.emotions)
        );
        if let Some(outcome) = &r.outcome_description {
            println!("     {}", truncate(outcome, 60));
        }
    }

    Ok(())
}
