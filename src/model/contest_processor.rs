use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::model::{
    error::ProcessorError,
    ledger::{CompetitorData, ContestPerformance, ProcessedContest, ScoringConfig},
    score_calculator,
    scoreboard::{parse_solve_time, RawEntry},
    structures::event_kind::EventKind
};

/// Why a row was left out of an otherwise successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A row earlier in the same scoreboard already claimed this identity;
    /// the first occurrence wins.
    DuplicateIdentity { first_row: usize }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::DuplicateIdentity { first_row } => {
                write!(f, "duplicate of row {first_row}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub identity: String,
    pub reason: SkipReason
}

/// What one ingestion call did. Callers use this to report "n applied,
/// m skipped" without digging through the ledger.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub event_id: String,
    pub kind: EventKind,
    pub first_time: bool,
    pub rows_applied: usize,
    pub skipped: Vec<SkippedRow>,
    pub total_participants: i32,
    pub max_problems_solved: i32
}

/// One participant after parsing and re-ranking, before any ledger write.
struct ScoredRow {
    identity: String,
    team_name: String,
    total_solved: i32,
    on_time_solved: i32,
    upsolving_count: i32,
    penalty: i64,
    rank: i32
}

/// Ingests one raw scoreboard into the ledger.
///
/// All parsing and validation happens before the first write, so any error
/// leaves `competitors` and `processed` exactly as they were. The first
/// ingestion of an event id freezes ranks and points; re-submissions only
/// recompute the upsolving delta.
#[allow(clippy::too_many_arguments)]
pub fn process(
    event_id: &str,
    entries: &[RawEntry],
    kind: EventKind,
    duration_minutes: i32,
    contest_index: i32,
    processing_date: NaiveDate,
    config: &ScoringConfig,
    competitors: &mut IndexMap<String, CompetitorData>,
    processed: &mut IndexMap<String, ProcessedContest>
) -> Result<IngestReport, ProcessorError> {
    if let Some(existing) = processed.get(event_id) {
        if existing.kind != kind {
            return Err(ProcessorError::KindMismatch {
                event_id: event_id.to_string(),
                stored: existing.kind,
                supplied: kind
            });
        }
    }

    let (mut rows, skipped) = parse_rows(entries, duration_minutes)?;

    // Re-rank on on-time performance. The sort is stable, so rows with equal
    // keys keep their scoreboard order and ranks stay deterministic.
    rows.sort_by(|a, b| {
        b.on_time_solved
            .cmp(&a.on_time_solved)
            .then(a.penalty.cmp(&b.penalty))
    });
    for (position, row) in rows.iter_mut().enumerate() {
        row.rank = position as i32 + 1;
    }

    let total_participants = rows.len() as i32;
    let max_on_time = rows.iter().map(|row| row.on_time_solved).max().unwrap_or(0);
    let first_time = !processed.contains_key(event_id);

    if first_time {
        info!(event_id, kind = %kind, total_participants, "processing new event");
    } else {
        info!(event_id, kind = %kind, total_participants, "updating event, upsolving only");
    }
    for skip in &skipped {
        warn!(event_id, row = skip.row, identity = %skip.identity, "skipped row: {}", skip.reason);
    }

    // Validation is done; everything below must succeed.
    let registry_entry = processed
        .entry(event_id.to_string())
        .or_insert_with(|| ProcessedContest {
            event_id: event_id.to_string(),
            kind,
            duration_minutes,
            first_processed_date: processing_date,
            last_updated_date: processing_date,
            participants: Default::default(),
            total_participants: 0,
            max_problems_solved: 0,
            chronological_index: contest_index
        });
    registry_entry.last_updated_date = processing_date;
    registry_entry.duration_minutes = duration_minutes;
    registry_entry.total_participants = total_participants;
    registry_entry.max_problems_solved = max_on_time;
    registry_entry.participants = rows.iter().map(|row| row.identity.clone()).collect();

    let weights = config.weights(kind);
    for row in &rows {
        let competitor = competitors
            .entry(row.identity.clone())
            .or_insert_with(|| CompetitorData::new(&row.identity, &row.team_name));
        // Team names change mid-season; the latest scoreboard wins.
        competitor.team_name = row.team_name.clone();

        if first_time {
            let performance = ContestPerformance {
                problems_solved: row.on_time_solved,
                rank: row.rank,
                total_participants,
                max_problems_solved: max_on_time,
                points_earned: score_calculator::hybrid_points(
                    row.on_time_solved,
                    row.rank,
                    max_on_time,
                    weights.base_weight,
                    contest_index,
                    weights.growth_period,
                    weights.bonus_top_n,
                    weights.bonus_max
                )
            };

            competitor
                .performances_mut(kind)
                .insert(event_id.to_string(), performance);
            competitor.bump_participation(kind);

            competitor
                .upsolving_by_event
                .insert(event_id.to_string(), row.upsolving_count);
            competitor.total_upsolving += row.upsolving_count;
        } else {
            let previous = competitor
                .upsolving_by_event
                .insert(event_id.to_string(), row.upsolving_count)
                .unwrap_or(0);
            competitor.total_upsolving += row.upsolving_count - previous;
        }
    }

    Ok(IngestReport {
        event_id: event_id.to_string(),
        kind,
        first_time,
        rows_applied: rows.len(),
        skipped,
        total_participants,
        max_problems_solved: max_on_time
    })
}

/// Per-row parse pass. Rows missing every identity field or carrying a
/// malformed solve time fail the whole ingestion; rows whose identity
/// duplicates an earlier row are recoverable and reported as skipped.
fn parse_rows(
    entries: &[RawEntry],
    duration_minutes: i32
) -> Result<(Vec<ScoredRow>, Vec<SkippedRow>), ProcessorError> {
    let mut rows: Vec<ScoredRow> = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (row_index, entry) in entries.iter().enumerate() {
        let identity = entry
            .identity()
            .ok_or(ProcessorError::MissingIdentity { row: row_index })?
            .to_string();

        if let Some(&first_row) = seen.get(&identity) {
            skipped.push(SkippedRow {
                row: row_index,
                identity,
                reason: SkipReason::DuplicateIdentity { first_row }
            });
            continue;
        }
        seen.insert(identity.clone(), row_index);

        let mut on_time_solved = 0;
        for (problem_id, cell) in &entry.problems {
            if !cell.solved {
                continue;
            }

            // A solved problem without a timestamp was solved after the
            // window closed; it counts toward upsolving via the total.
            let Some(time) = cell.time.as_deref() else {
                continue;
            };

            let minutes = parse_solve_time(time).ok_or_else(|| ProcessorError::BadSolveTime {
                row: row_index,
                problem: problem_id.clone(),
                value: time.to_string()
            })?;

            if minutes <= duration_minutes {
                on_time_solved += 1;
            }
        }

        let team_name = entry
            .team_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| identity.clone());

        rows.push(ScoredRow {
            identity,
            team_name,
            total_solved: entry.score,
            on_time_solved,
            upsolving_count: entry.score - on_time_solved,
            penalty: entry.penalty,
            rank: 0
        });
    }

    Ok((rows, skipped))
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            contest_processor::{process, SkipReason},
            error::ProcessorError,
            ledger::{CompetitorData, ProcessedContest, ScoringConfig},
            structures::event_kind::EventKind
        },
        utils::test_utils::{generate_entry, test_date}
    };
    use approx::assert_abs_diff_eq;
    use indexmap::IndexMap;

    fn worked_example_config() -> ScoringConfig {
        let mut config = ScoringConfig::default();
        config.contest_bonus_top_n = 2;
        config.contest_bonus_max = 20.0;
        config
    }

    fn empty_ledger() -> (IndexMap<String, CompetitorData>, IndexMap<String, ProcessedContest>) {
        (IndexMap::new(), IndexMap::new())
    }

    #[test]
    fn test_worked_example_points() {
        let entries = vec![
            generate_entry(Some("A"), "team-a", &[(true, Some("1:00:00")), (true, Some("2:00:00"))], 180),
            generate_entry(Some("B"), "team-b", &[(true, Some("0:30:00")), (false, None)], 30),
            generate_entry(Some("C"), "team-c", &[(false, None), (false, None)], 0),
        ];
        let config = worked_example_config();
        let (mut competitors, mut processed) = empty_ledger();

        let report = process(
            "week1",
            &entries,
            EventKind::Contest,
            300,
            0,
            test_date(),
            &config,
            &mut competitors,
            &mut processed
        )
        .unwrap();

        assert!(report.first_time);
        assert_eq!(report.rows_applied, 3);
        assert_eq!(report.max_problems_solved, 2);

        let a = &competitors["A"].contests["week1"];
        let b = &competitors["B"].contests["week1"];
        let c = &competitors["C"].contests["week1"];

        assert_eq!((a.rank, b.rank, c.rank), (1, 2, 3));
        assert_abs_diff_eq!(a.points_earned, 120.0);
        assert_abs_diff_eq!(b.points_earned, 60.0);
        assert_abs_diff_eq!(c.points_earned, 0.0);
    }

    #[test]
    fn test_on_time_cutoff_and_null_times() {
        // Two solved problems: one at 4:00 (inside a 300 minute window), one
        // with no timestamp (solved after the window). Only the first is
        // on-time; the other lands in upsolving.
        let entries = vec![generate_entry(
            Some("alice"),
            "solo",
            &[(true, Some("4:00:00")), (true, None)],
            240
        )];
        let (mut competitors, mut processed) = empty_ledger();

        process(
            "week1",
            &entries,
            EventKind::Contest,
            300,
            0,
            test_date(),
            &ScoringConfig::default(),
            &mut competitors,
            &mut processed
        )
        .unwrap();

        let alice = &competitors["alice"];
        assert_eq!(alice.contests["week1"].problems_solved, 1);
        assert_eq!(alice.upsolving_by_event["week1"], 1);
        assert_eq!(alice.total_upsolving, 1);
    }

    #[test]
    fn test_solve_past_duration_is_upsolving() {
        let entries = vec![generate_entry(Some("bob"), "solo", &[(true, Some("5:01:00"))], 301)];
        let (mut competitors, mut processed) = empty_ledger();

        process(
            "week1",
            &entries,
            EventKind::Contest,
            300,
            0,
            test_date(),
            &ScoringConfig::default(),
            &mut competitors,
            &mut processed
        )
        .unwrap();

        assert_eq!(competitors["bob"].contests["week1"].problems_solved, 0);
        assert_eq!(competitors["bob"].total_upsolving, 1);
    }

    #[test]
    fn test_ranking_breaks_ties_by_penalty_then_input_order() {
        let entries = vec![
            generate_entry(Some("slow"), "t1", &[(true, Some("1:00:00"))], 120),
            generate_entry(Some("fast"), "t2", &[(true, Some("0:30:00"))], 30),
            generate_entry(Some("tied-first"), "t3", &[(true, Some("0:45:00"))], 45),
            generate_entry(Some("tied-second"), "t4", &[(true, Some("0:45:00"))], 45),
        ];
        let (mut competitors, mut processed) = empty_ledger();

        process(
            "week1",
            &entries,
            EventKind::Contest,
            300,
            0,
            test_date(),
            &ScoringConfig::default(),
            &mut competitors,
            &mut processed
        )
        .unwrap();

        assert_eq!(competitors["fast"].contests["week1"].rank, 1);
        // Equal sort keys keep scoreboard order: tied-first before tied-second
        assert_eq!(competitors["tied-first"].contests["week1"].rank, 2);
        assert_eq!(competitors["tied-second"].contests["week1"].rank, 3);
        assert_eq!(competitors["slow"].contests["week1"].rank, 4);
    }

    #[test]
    fn test_update_recomputes_upsolving_only() {
        let first = vec![generate_entry(Some("alice"), "solo", &[(true, Some("1:00:00"))], 60)];
        let config = ScoringConfig::default();
        let (mut competitors, mut processed) = empty_ledger();

        process(
            "week1",
            &first,
            EventKind::Contest,
            300,
            0,
            test_date(),
            &config,
            &mut competitors,
            &mut processed
        )
        .unwrap();

        let frozen_points = competitors["alice"].contests["week1"].points_earned;
        let frozen_rank = competitors["alice"].contests["week1"].rank;

        // Re-submission: alice has now upsolved a second problem.
        let second = vec![generate_entry(
            Some("alice"),
            "solo",
            &[(true, Some("1:00:00")), (true, None)],
            60
        )];
        let report = process(
            "week1",
            &second,
            EventKind::Contest,
            300,
            1,
            test_date(),
            &config,
            &mut competitors,
            &mut processed
        )
        .unwrap();

        assert!(!report.first_time);
        let alice = &competitors["alice"];
        assert_eq!(alice.contests["week1"].points_earned, frozen_points);
        assert_eq!(alice.contests["week1"].rank, frozen_rank);
        assert_eq!(alice.contests_participated, 1);
        assert_eq!(alice.upsolving_by_event["week1"], 1);
        assert_eq!(alice.total_upsolving, 1);
    }

    #[test]
    fn test_repeated_update_with_identical_input_is_idempotent() {
        let entries = vec![generate_entry(
            Some("alice"),
            "solo",
            &[(true, Some("1:00:00")), (true, None)],
            60
        )];
        let config = ScoringConfig::default();
        let (mut competitors, mut processed) = empty_ledger();

        for index in 0..3 {
            process(
                "week1",
                &entries,
                EventKind::Contest,
                300,
                index.min(1),
                test_date(),
                &config,
                &mut competitors,
                &mut processed
            )
            .unwrap();
        }

        let alice = &competitors["alice"];
        assert_eq!(alice.total_upsolving, 1);
        assert_eq!(alice.upsolving_by_event["week1"], 1);
        assert_eq!(alice.contests_participated, 1);
    }

    #[test]
    fn test_update_keeps_first_date_and_index_but_refreshes_stats() {
        let first = vec![generate_entry(Some("alice"), "solo", &[(true, Some("1:00:00"))], 60)];
        let config = ScoringConfig::default();
        let (mut competitors, mut processed) = empty_ledger();

        let day_one = test_date();
        let day_two = day_one.succ_opt().unwrap();

        process(
            "week1",
            &first,
            EventKind::Contest,
            300,
            0,
            day_one,
            &config,
            &mut competitors,
            &mut processed
        )
        .unwrap();

        // A corrected scoreboard arrives later with one more participant.
        let second = vec![
            generate_entry(Some("alice"), "Team Nova", &[(true, Some("1:00:00"))], 60),
            generate_entry(Some("bob"), "solo", &[(false, None)], 0),
        ];
        process(
            "week1",
            &second,
            EventKind::Contest,
            300,
            7,
            day_two,
            &config,
            &mut competitors,
            &mut processed
        )
        .unwrap();

        let registry = &processed["week1"];
        assert_eq!(registry.first_processed_date, day_one);
        assert_eq!(registry.last_updated_date, day_two);
        assert_eq!(registry.chronological_index, 0);
        assert_eq!(registry.total_participants, 2);
        assert!(registry.participants.contains("bob"));

        // Team rename propagates even on the update path.
        assert_eq!(competitors["alice"].team_name, "Team Nova");
        // But bob never earns a performance: points are frozen at first
        // ingestion and late additions only contribute upsolving.
        assert!(competitors["bob"].contests.is_empty());
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let entries = vec![generate_entry(Some("alice"), "solo", &[(true, Some("1:00:00"))], 60)];
        let config = ScoringConfig::default();
        let (mut competitors, mut processed) = empty_ledger();

        process(
            "week1",
            &entries,
            EventKind::Contest,
            300,
            0,
            test_date(),
            &config,
            &mut competitors,
            &mut processed
        )
        .unwrap();

        let result = process(
            "week1",
            &entries,
            EventKind::Homework,
            300,
            0,
            test_date(),
            &config,
            &mut competitors,
            &mut processed
        );

        assert!(matches!(result, Err(ProcessorError::KindMismatch { .. })));
        assert_eq!(competitors["alice"].total_upsolving, 0);
    }

    #[test]
    fn test_missing_identity_fails_without_mutation() {
        let entries = vec![
            generate_entry(Some("alice"), "solo", &[(true, Some("1:00:00"))], 60),
            generate_entry(None, "", &[(false, None)], 0),
        ];
        let (mut competitors, mut processed) = empty_ledger();

        let result = process(
            "week1",
            &entries,
            EventKind::Contest,
            300,
            0,
            test_date(),
            &ScoringConfig::default(),
            &mut competitors,
            &mut processed
        );

        assert!(matches!(result, Err(ProcessorError::MissingIdentity { row: 1 })));
        assert!(competitors.is_empty());
        assert!(processed.is_empty());
    }

    #[test]
    fn test_bad_solve_time_fails_without_mutation() {
        let entries = vec![generate_entry(Some("alice"), "solo", &[(true, Some("later"))], 60)];
        let (mut competitors, mut processed) = empty_ledger();

        let result = process(
            "week1",
            &entries,
            EventKind::Contest,
            300,
            0,
            test_date(),
            &ScoringConfig::default(),
            &mut competitors,
            &mut processed
        );

        assert!(matches!(result, Err(ProcessorError::BadSolveTime { .. })));
        assert!(competitors.is_empty());
        assert!(processed.is_empty());
    }

    #[test]
    fn test_duplicate_identity_is_skipped_with_report() {
        let entries = vec![
            generate_entry(Some("alice"), "solo", &[(true, Some("1:00:00"))], 60),
            generate_entry(Some("alice"), "solo", &[(false, None)], 0),
        ];
        let (mut competitors, mut processed) = empty_ledger();

        let report = process(
            "week1",
            &entries,
            EventKind::Contest,
            300,
            0,
            test_date(),
            &ScoringConfig::default(),
            &mut competitors,
            &mut processed
        )
        .unwrap();

        assert_eq!(report.rows_applied, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].row, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::DuplicateIdentity { first_row: 0 });

        // The first occurrence won.
        assert_eq!(competitors["alice"].contests["week1"].problems_solved, 1);
        assert_eq!(processed["week1"].total_participants, 1);
    }

    #[test]
    fn test_empty_scoreboard_registers_event() {
        let (mut competitors, mut processed) = empty_ledger();

        let report = process(
            "week0",
            &[],
            EventKind::Homework,
            300,
            0,
            test_date(),
            &ScoringConfig::default(),
            &mut competitors,
            &mut processed
        )
        .unwrap();

        assert_eq!(report.total_participants, 0);
        assert_eq!(report.max_problems_solved, 0);
        assert!(processed.contains_key("week0"));
        assert!(competitors.is_empty());
    }
}
