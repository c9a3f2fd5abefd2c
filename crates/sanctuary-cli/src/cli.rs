//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use sanctuary_core::models::EmotionEntry;
use sanctuary_core::tools::EntryFilterParams;

/// Sanctuary - A journal of familiars, rituals, and the emotions around them
#[derive(Parser)]
#[command(name = "sanctuary")]
#[command(about = "Emotional journal for familiar interactions and ritual outcomes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, env = "SANCTUARY_DB", default_value = "sanctuary.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Log a new journal entry
    Log {
        #[command(subcommand)]
        entry: LogEntry,
    },

    /// List logged interactions
    Interactions {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// List logged ritual outcomes
    Rituals {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Show insights across the journal, or for a single ritual
    Insights {
        /// Only analyze outcomes of this ritual
        #[arg(long)]
        ritual: Option<String>,

        /// Only analyze entries recorded by this model
        #[arg(long)]
        model: Option<String>,
    },

    /// Show emotion counts per model
    Emotions,

    /// Show database status (size, entry counts, time span)
    Status,

    /// Start the MCP server
    Serve {
        /// Host to bind to
        #[arg(long, env = "SANCTUARY_MCP_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "SANCTUARY_MCP_PORT", default_value = "3001")]
        port: u16,

        /// Speak MCP over stdin/stdout instead of HTTP
        ///
        /// Use this when an MCP client launches sanctuary as a subprocess.
        /// --host and --port are ignored.
        #[arg(long)]
        stdio: bool,
    },
}

#[derive(Subcommand)]
pub enum LogEntry {
    /// Log an interaction with a familiar
    Interaction {
        /// Familiar encountered (e.g., owl, gardener)
        #[arg(short, long)]
        familiar: String,

        /// Kind of interaction (e.g., conversation, vision, dream)
        #[arg(short, long)]
        kind: String,

        /// Emotion felt, as name=intensity (repeatable, e.g. --emotion joy=0.8)
        #[arg(short, long = "emotion", value_parser = parse_emotion)]
        emotions: Vec<EmotionEntry>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,

        /// Model or agent recording the entry
        #[arg(long)]
        model: Option<String>,

        /// When it happened: ISO-8601 or epoch seconds (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Log the outcome of a ritual
    #[command(group(ArgGroup::new("result").required(true).args(["success", "failed"])))]
    Ritual {
        /// Name of the ritual (e.g., "Moon Rite")
        #[arg(short, long)]
        name: String,

        /// The ritual met its intention
        #[arg(long)]
        success: bool,

        /// The ritual did not meet its intention
        #[arg(long)]
        failed: bool,

        /// Emotion felt, as name=intensity (repeatable)
        #[arg(short, long = "emotion", value_parser = parse_emotion)]
        emotions: Vec<EmotionEntry>,

        /// What happened as a result
        #[arg(long)]
        outcome: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,

        /// Model or agent recording the entry
        #[arg(long)]
        model: Option<String>,

        /// When it happened: ISO-8601 or epoch seconds (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
}

/// Model and time-range filters shared by the listing commands
#[derive(Args, Debug, Default)]
pub struct RangeArgs {
    /// Only entries recorded by this model
    #[arg(long)]
    pub model: Option<String>,

    /// Earliest timestamp, inclusive (ISO-8601 or epoch seconds)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest timestamp, inclusive (ISO-8601 or epoch seconds)
    #[arg(long)]
    pub to: Option<String>,
}

impl RangeArgs {
    pub fn into_params(self) -> EntryFilterParams {
        EntryFilterParams {
            model_id: self.model,
            start: self.from.as_deref().map(timestamp_arg),
            end: self.to.as_deref().map(timestamp_arg),
        }
    }
}

/// Parse `name=intensity` into an emotion (range checks happen when logging)
pub fn parse_emotion(s: &str) -> Result<EmotionEntry, String> {
    let (name, intensity) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=intensity, got '{}'", s))?;

    let intensity: f64 = intensity
        .trim()
        .parse()
        .map_err(|_| format!("invalid intensity '{}' for emotion '{}'", intensity, name))?;

    Ok(EmotionEntry {
        name: name.trim().to_string(),
        intensity,
    })
}

/// Timestamp argument as a tool value: numbers are epoch seconds, anything else ISO-8601
pub fn timestamp_arg(s: &str) -> serde_json::Value {
    match s.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() => serde_json::json!(secs),
        _ => serde_json::Value::String(s.to_string()),
    }
}
