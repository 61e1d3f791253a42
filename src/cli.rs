use chrono::NaiveDate;
use itertools::Itertools;
use serde::Deserialize;
use std::{fs, path::PathBuf, str::FromStr};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    args::{Args, Command},
    model::{
        contest_processor::IngestReport,
        error::ProcessorError,
        ledger::ScoringConfig,
        rating_system::RatingSystem,
        structures::{competitor_status::CompetitorStatus, event_kind::EventKind}
    },
    persistence::json_store::{JsonLedgerStore, LedgerDocument, StoreError},
    utils::progress_utils::progress_bar
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Processor(#[from] ProcessorError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid status {0:?}, expected active, blacklisted or guest")]
    InvalidStatus(String),

    #[error("failed to read batch manifest: {0}")]
    ManifestIo(std::io::Error),

    #[error("batch manifest is not valid JSON: {0}")]
    ManifestFormat(serde_json::Error),

    #[error("{failed} of {total} scoreboards failed to ingest")]
    BatchFailures { failed: usize, total: usize }
}

/// One line of a batch manifest.
#[derive(Debug, Deserialize)]
pub struct BatchItem {
    pub event_id: String,
    pub file: PathBuf,
    pub kind: String,
    #[serde(default = "default_duration")]
    pub duration: i32,
    #[serde(default)]
    pub date: Option<NaiveDate>
}

fn default_duration() -> i32 {
    300
}

pub fn run(args: Args) -> i32 {
    match execute(&args) {
        Ok(()) => 0,
        Err(e) => {
            error!("{e}");
            1
        }
    }
}

fn execute(args: &Args) -> Result<(), CliError> {
    let store = JsonLedgerStore::new(&args.ledger);
    let mut system = store.load_or_empty().into_rating_system();

    // Files arrive out of calendar order across sessions; fix chronology
    // before anything reads or extends it.
    system.reassign_contest_order_indices();
    system.recalculate_all_scores();

    let mutated = match &args.command {
        Command::Process {
            event_id,
            file,
            kind,
            duration,
            date
        } => {
            let kind = parse_kind(kind)?;
            let entries = crate::model::scoreboard::load_scoreboard(file)?;
            let report = match date {
                Some(date) => {
                    system.ingest_scoreboard_dated(event_id, &entries, kind, *duration, *date)?
                }
                None => system.ingest_scoreboard(event_id, &entries, kind, *duration)?
            };
            log_report(&report);
            true
        }
        Command::Batch { manifest } => {
            run_batch(&mut system, manifest, &store)?;
            // run_batch saves after each successful item itself
            false
        }
        Command::Rankings { all } => {
            print_rankings(&system, *all);
            false
        }
        Command::Config => {
            print_config(system.config());
            false
        }
        Command::SetConfig { name, value } => {
            system.edit_config(name, value)?;
            system.recalculate_all_scores();
            info!(name = %name, value = %value, "configuration updated");
            true
        }
        Command::SetStatus { user, status } => {
            let status = CompetitorStatus::from_str(status)
                .map_err(|_| CliError::InvalidStatus(status.clone()))?;
            system.set_status(user, status)?;
            system.recalculate_all_scores();
            info!(user = %user, status = %status, "status updated");
            true
        }
        Command::RemoveCompetitor { user } => {
            system.remove_competitor(user)?;
            system.recalculate_all_scores();
            info!(user = %user, "competitor removed");
            true
        }
        Command::DeleteEvent { event_id } => {
            system.delete_event(event_id)?;
            system.recalculate_all_scores();
            info!(event_id = %event_id, "event deleted");
            true
        }
        Command::Replay => {
            system.replay_all_points();
            info!("replayed all frozen scores under the current config");
            true
        }
        Command::Reindex => {
            system.reassign_contest_order_indices();
            info!("chronological indices reassigned from first-processed dates");
            true
        }
    };

    if mutated {
        store.save(&LedgerDocument::from(&system))?;
    }

    Ok(())
}

fn parse_kind(kind: &str) -> Result<EventKind, ProcessorError> {
    EventKind::from_str(kind).map_err(|_| ProcessorError::InvalidKind(kind.to_string()))
}

/// Ingests every manifest item, saving after each success so a failure in
/// the middle of a batch loses nothing already applied.
fn run_batch(
    system: &mut RatingSystem,
    manifest: &PathBuf,
    store: &JsonLedgerStore
) -> Result<(), CliError> {
    let content = fs::read_to_string(manifest).map_err(CliError::ManifestIo)?;
    let items: Vec<BatchItem> = serde_json::from_str(&content).map_err(CliError::ManifestFormat)?;

    let bar = progress_bar(items.len() as u64, "Ingesting scoreboards".to_string());
    let mut failed = 0;

    for item in &items {
        let outcome = parse_kind(&item.kind)
            .map_err(CliError::from)
            .and_then(|kind| {
                let entries = crate::model::scoreboard::load_scoreboard(&item.file)?;
                let report = match item.date {
                    Some(date) => system.ingest_scoreboard_dated(
                        &item.event_id,
                        &entries,
                        kind,
                        item.duration,
                        date
                    )?,
                    None => system.ingest_scoreboard(&item.event_id, &entries, kind, item.duration)?
                };
                Ok(report)
            });

        match outcome {
            Ok(report) => {
                log_report(&report);
                store.save(&LedgerDocument::from(&*system))?;
            }
            Err(e) => {
                failed += 1;
                error!(event_id = %item.event_id, "failed to ingest: {e}");
            }
        }

        bar.inc(1);
    }

    bar.finish();
    info!(total = items.len(), failed, "batch complete");

    if failed > 0 {
        return Err(CliError::BatchFailures {
            failed,
            total: items.len()
        });
    }

    Ok(())
}

fn log_report(report: &IngestReport) {
    if report.first_time {
        info!(
            event_id = %report.event_id,
            kind = %report.kind,
            participants = report.total_participants,
            max_solved = report.max_problems_solved,
            "new event processed"
        );
    } else {
        info!(
            event_id = %report.event_id,
            kind = %report.kind,
            participants = report.total_participants,
            "event updated, upsolving recomputed"
        );
    }

    if !report.skipped.is_empty() {
        warn!(
            event_id = %report.event_id,
            applied = report.rows_applied,
            skipped = report.skipped.len(),
            "some rows were skipped"
        );
    }
}

fn print_rankings(system: &RatingSystem, all: bool) {
    let standings: Vec<_> = if all {
        system
            .competitors()
            .values()
            .sorted_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap())
            .collect()
    } else {
        system.standings()
    };

    println!(
        "{:>4}  {:<24} {:<20} {:>10} {:>10} {:>10} {:>10}  {}",
        "#", "user", "team", "contest", "homework", "upsolving", "final", "status"
    );
    for (position, competitor) in standings.iter().enumerate() {
        println!(
            "{:>4}  {:<24} {:<20} {:>10.2} {:>10.2} {:>10.2} {:>10.2}  {}",
            position + 1,
            competitor.user_name,
            competitor.team_name,
            competitor.total_contest_points,
            competitor.total_homework_points,
            competitor.total_upsolving_points,
            competitor.final_score,
            match competitor.status {
                CompetitorStatus::Active => "",
                CompetitorStatus::Blacklisted => "(blacklisted)",
                CompetitorStatus::Guest => "(guest)"
            }
        );
    }
}

fn print_config(config: &ScoringConfig) {
    println!("contest-base-weight     = {}", config.contest_base_weight);
    println!("contest-growth-period   = {}", config.contest_growth_period);
    println!("contest-bonus-top-n     = {}", config.contest_bonus_top_n);
    println!("contest-bonus-max       = {}", config.contest_bonus_max);
    println!("homework-base-weight    = {}", config.homework_base_weight);
    println!("homework-growth-period  = {}", config.homework_growth_period);
    println!("homework-bonus-top-n    = {}", config.homework_bonus_top_n);
    println!("homework-bonus-max      = {}", config.homework_bonus_max);
    println!("upsolving-points        = {}", config.upsolving_points_per_problem);
    println!("min-contests            = {}", config.min_contests_required);
    println!("min-homeworks           = {}", config.min_homeworks_required);
}
