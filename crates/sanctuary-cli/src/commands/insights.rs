//! Insight commands (insights, emotions)

use anyhow::Result;
use sanctuary_core::db::Database;
use sanctuary_core::insights::{generate_insights, PatternInsight};
use sanctuary_core::tools::{self, EntryFilterParams, RitualInsightsParams};

use super::print_json;

/// Insights for the requested scope: one ritual, one model, or the whole journal
pub fn collect_insights(
    db: &Database,
    ritual: Option<&str>,
    model: Option<&str>,
) -> Result<Vec<PatternInsight>> {
    if let Some(ritual_name) = ritual {
        let params = RitualInsightsParams {
            ritual_name: ritual_name.to_string(),
            model_id: model.map(str::to_string),
        };
        return Ok(tools::query_ritual_insights(db, params)?);
    }

    if let Some(model_id) = model {
        let filter = || EntryFilterParams {
            model_id: Some(model_id.to_string()),
            ..Default::default()
        };
        let interactions = tools::get_interactions(db, filter())?;
        let rituals = tools::get_rituals(db, filter())?;
        return Ok(generate_insights(&interactions, &rituals));
    }

    Ok(tools::get_insights(db)?)
}

pub fn cmd_insights(
    db: &Database,
    ritual: Option<&str>,
    model: Option<&str>,
    json: bool,
) -> Result<()> {
    let insights = collect_insights(db, ritual, model)?;

    if json {
        return print_json(&insights);
    }

    if insights.is_empty() {
        match ritual {
            Some(name) => println!("No outcomes logged for ritual '{}'.", name),
            None => println!("No insights yet."),
        }
        return Ok(());
    }

    println!();
    println!("🔮 Insights");
    println!("   ─────────────────────────────────────────────────────────────");

    for insight in &insights {
        println!();
        println!("   {}", insight.description);
        for (key, value) in insight.metrics.iter() {
            println!("     {:<20} {:.3}", key, value);
        }
    }

    Ok(())
}

pub fn cmd_emotions(db: &Database, json: bool) -> Result<()> {
    let by_model = tools::query_emotions_by_model(db)?;

    if json {
        return print_json(&by_model);
    }

    if by_model.is_empty() {
        println!("No emotions logged yet.");
        return Ok(());
    }

    println!();
    println!("💭 Emotions by Model");
    println!("   ─────────────────────────────────────────────────────────────");

    for (model, counts) in by_model.iter() {
        let listed: Vec<String> = counts
            .iter()
            .map(|(name, count)| format!("{} ({})", name, count))
            .collect();
        println!("   {:<16} │ {}", model, listed.join(", "));
    }

    Ok(())
}
