//! Sanctuary CLI - Emotional journal for familiars and rituals
//!
//! Usage:
//!   sanctuary init                                  Initialize database
//!   sanctuary log interaction --familiar owl ...    Log an interaction
//!   sanctuary log ritual --name "Moon Rite" ...     Log a ritual outcome
//!   sanctuary insights                              Show journal insights
//!   sanctuary serve --port 3001                     Start MCP server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use sanctuary_core::tools::{LogInteractionParams, LogRitualParams};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so stdout stays clean for --json and MCP over stdio
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Log { entry } => {
            let db = commands::open_db(&cli.db)?;
            match entry {
                LogEntry::Interaction {
                    familiar,
                    kind,
                    emotions,
                    notes,
                    model,
                    at,
                } => {
                    let params = LogInteractionParams {
                        familiar_id: familiar,
                        interaction_type: kind,
                        emotions: Some(emotions),
                        notes,
                        model_id: model,
                        timestamp: at.as_deref().map(timestamp_arg),
                    };
                    commands::cmd_log_interaction(&db, params, cli.json)
                }
                LogEntry::Ritual {
                    name,
                    success,
                    failed: _,
                    emotions,
                    outcome,
                    notes,
                    model,
                    at,
                } => {
                    let params = LogRitualParams {
                        ritual_name: name,
                        success,
                        emotions: Some(emotions),
                        outcome_description: outcome,
                        notes,
                        model_id: model,
                        timestamp: at.as_deref().map(timestamp_arg),
                    };
                    commands::cmd_log_ritual(&db, params, cli.json)
                }
            }
        }
        Commands::Interactions { range } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_interactions(&db, range.into_params(), cli.json)
        }
        Commands::Rituals { range } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_rituals(&db, range.into_params(), cli.json)
        }
        Commands::Insights { ritual, model } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_insights(&db, ritual.as_deref(), model.as_deref(), cli.json)
        }
        Commands::Emotions => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_emotions(&db, cli.json)
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.json),
        Commands::Serve { host, port, stdio } => {
            commands::cmd_serve(&cli.db, &host, port, stdio).await
        }
    }
}
