use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(
    display_name = "Ladder Processor",
    long_about = "Maintains a cumulative leaderboard for a recurring series of \
    programming contests and homework sets"
)]
pub struct Args {
    /// The ledger is a single JSON document holding the scoring config,
    /// every competitor, and the processed-event registry. A missing file
    /// starts an empty season.
    #[arg(
        long,
        env = "LEDGER_PATH",
        default_value = "ladder.json",
        help = "Path to the ledger JSON document"
    )]
    pub ledger: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Ingest one raw scoreboard file
    Process {
        /// Unique event id, e.g. "contest-07"
        event_id: String,
        /// Scoreboard JSON file produced by the spreadsheet converter
        file: PathBuf,
        /// Event kind: "contest" or "homework"
        kind: String,
        #[arg(short, long, default_value_t = 300, help = "Event window in minutes")]
        duration: i32,
        #[arg(long, help = "Processing date override (YYYY-MM-DD) for backfills")]
        date: Option<NaiveDate>
    },
    /// Ingest every scoreboard listed in a batch manifest
    Batch {
        /// JSON array of {event_id, file, kind, duration?, date?}
        manifest: PathBuf
    },
    /// Print the current standings
    Rankings {
        #[arg(long, help = "Include blacklisted and ineligible competitors")]
        all: bool
    },
    /// Show the scoring configuration
    Config,
    /// Edit one scoring parameter, then recalculate and save
    SetConfig { name: String, value: String },
    /// Change a competitor's status: active, blacklisted or guest
    SetStatus { user: String, status: String },
    /// Remove a competitor and purge them from every participant set
    RemoveCompetitor { user: String },
    /// Delete a processed event and unwind its contributions
    DeleteEvent { event_id: String },
    /// Recompute every frozen per-event score under the current config
    /// and chronological indices
    Replay,
    /// Renumber chronological indices from first-processed dates
    Reindex
}
