//! Status command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::{open_db, print_json};

pub fn cmd_status(db_path: &Path, json: bool) -> Result<()> {
    if !db_path.exists() {
        if json {
            return print_json(&serde_json::json!({
                "database": db_path.display().to_string(),
                "initialized": false,
            }));
        }
        println!("   Database: {} (not initialized)", db_path.display());
        println!("   Run: sanctuary init");
        return Ok(());
    }

    let db = open_db(db_path)?;
    let stats = db.journal_stats().context("Failed to read journal stats")?;
    let size_bytes = std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

    if json {
        return print_json(&serde_json::json!({
            "database": db_path.display().to_string(),
            "initialized": true,
            "size_bytes": size_bytes,
            "stats": stats,
        }));
    }

    println!();
    println!("📊 Sanctuary Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Database: {}", db_path.display());

    let size_kb = size_bytes as f64 / 1024.0;
    if size_kb < 1024.0 {
        println!("   Size: {:.1} KB", size_kb);
    } else {
        println!("   Size: {:.1} MB", size_kb / 1024.0);
    }

    println!();
    println!("   Interactions: {}", stats.interactions);
    println!("   Rituals: {}", stats.rituals);

    if let (Some(first), Some(last)) = (stats.first_entry, stats.last_entry) {
        println!(
            "   Span: {} → {}",
            first.format("%Y-%m-%d %H:%M"),
            last.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
