use chrono::{Local, NaiveDate};
use indexmap::IndexMap;
use itertools::Itertools;
use std::path::Path;
use strum::IntoEnumIterator;
use tracing::warn;

use crate::model::{
    contest_processor::{self, IngestReport},
    error::ProcessorError,
    ledger::{CompetitorData, ProcessedContest, ScoringConfig},
    score_calculator,
    scoreboard::{self, RawEntry},
    structures::{competitor_status::CompetitorStatus, event_kind::EventKind}
};

/// Owner of the ledger: scoring config, competitors, and the processed-event
/// registry. All mutation goes through here; callers hold the one instance
/// for the lifetime of a run.
#[derive(Debug, Default)]
pub struct RatingSystem {
    config: ScoringConfig,
    competitors: IndexMap<String, CompetitorData>,
    processed_contests: IndexMap<String, ProcessedContest>
}

impl RatingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a system from persisted parts. Callers should follow up with
    /// [`reassign_contest_order_indices`](Self::reassign_contest_order_indices)
    /// and [`recalculate_all_scores`](Self::recalculate_all_scores) before
    /// ingesting anything new.
    pub fn from_parts(
        config: ScoringConfig,
        competitors: IndexMap<String, CompetitorData>,
        processed_contests: IndexMap<String, ProcessedContest>
    ) -> Self {
        RatingSystem {
            config,
            competitors,
            processed_contests
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn competitors(&self) -> &IndexMap<String, CompetitorData> {
        &self.competitors
    }

    pub fn processed_contests(&self) -> &IndexMap<String, ProcessedContest> {
        &self.processed_contests
    }

    /// Loads a raw scoreboard file and ingests it under today's date.
    /// On success every competitor total is recalculated.
    pub fn process_scoreboard(
        &mut self,
        event_id: &str,
        path: &Path,
        kind: EventKind,
        duration_minutes: i32
    ) -> Result<IngestReport, ProcessorError> {
        let entries = scoreboard::load_scoreboard(path)?;
        self.ingest_scoreboard(event_id, &entries, kind, duration_minutes)
    }

    /// Ingests in-memory entries under today's date.
    pub fn ingest_scoreboard(
        &mut self,
        event_id: &str,
        entries: &[RawEntry],
        kind: EventKind,
        duration_minutes: i32
    ) -> Result<IngestReport, ProcessorError> {
        self.ingest_scoreboard_dated(event_id, entries, kind, duration_minutes, Local::now().date_naive())
    }

    /// Ingests with an explicit processing date. Useful for backfills, where
    /// the calendar position of an event matters more than the day the file
    /// finally arrived.
    pub fn ingest_scoreboard_dated(
        &mut self,
        event_id: &str,
        entries: &[RawEntry],
        kind: EventKind,
        duration_minutes: i32,
        processing_date: NaiveDate
    ) -> Result<IngestReport, ProcessorError> {
        // Chronological position among same-kind events at call time. On the
        // update path the count includes the event itself, but updates never
        // read the index, so the off-by-one is harmless.
        let contest_index = self
            .processed_contests
            .values()
            .filter(|event| event.kind == kind)
            .count() as i32;

        let report = contest_processor::process(
            event_id,
            entries,
            kind,
            duration_minutes,
            contest_index,
            processing_date,
            &self.config,
            &mut self.competitors,
            &mut self.processed_contests
        )?;

        self.recalculate_all_scores();

        Ok(report)
    }

    /// Re-derives every competitor's subtotals and final score from stored
    /// per-event points and upsolving counts. Cheap and idempotent; must run
    /// after any manual edit to competitors, status, or configuration.
    pub fn recalculate_all_scores(&mut self) {
        for competitor in self.competitors.values_mut() {
            competitor.total_contest_points = competitor
                .contests
                .values()
                .map(|performance| performance.points_earned)
                .sum();

            competitor.total_homework_points = competitor
                .homeworks
                .values()
                .map(|performance| performance.points_earned)
                .sum();

            competitor.total_upsolving_points =
                competitor.total_upsolving as f64 * self.config.upsolving_points_per_problem;

            competitor.final_score = competitor.total_contest_points
                + competitor.total_homework_points
                + competitor.total_upsolving_points;
        }
    }

    /// Re-sorts the registry by first-processed date (ties keep registration
    /// order) and renumbers `chronological_index` 0-based, separately per
    /// kind. Run once after a bulk load, before new ingestion, so indices
    /// match calendar order even when files arrived out of sequence.
    pub fn reassign_contest_order_indices(&mut self) {
        for kind in EventKind::iter() {
            let ordered: Vec<String> = self
                .processed_contests
                .values()
                .filter(|event| event.kind == kind)
                .sorted_by_key(|event| event.first_processed_date)
                .map(|event| event.event_id.clone())
                .collect();

            for (index, event_id) in ordered.iter().enumerate() {
                if let Some(event) = self.processed_contests.get_mut(event_id) {
                    event.chronological_index = index as i32;
                }
            }
        }
    }

    /// Administrative full replay: recomputes every frozen `points_earned`
    /// from its stored rank/solved/max, the event's current chronological
    /// index, and the current config, then recalculates totals. This is the
    /// only operation that touches frozen points.
    pub fn replay_all_points(&mut self) {
        let config = &self.config;
        let processed = &self.processed_contests;

        for competitor in self.competitors.values_mut() {
            for kind in EventKind::iter() {
                let weights = config.weights(kind);

                for (event_id, performance) in competitor.performances_mut(kind) {
                    let Some(event) = processed.get(event_id) else {
                        warn!(event_id = %event_id, "performance references an event missing from the registry");
                        continue;
                    };

                    performance.points_earned = score_calculator::hybrid_points(
                        performance.problems_solved,
                        performance.rank,
                        performance.max_problems_solved,
                        weights.base_weight,
                        event.chronological_index,
                        weights.growth_period,
                        weights.bonus_top_n,
                        weights.bonus_max
                    );
                }
            }
        }

        self.recalculate_all_scores();
    }

    /// Edits one named scoring parameter. The caller is responsible for the
    /// follow-up recalculation (the CLI always does both).
    pub fn edit_config(&mut self, name: &str, value: &str) -> Result<(), ProcessorError> {
        self.config.set(name, value)
    }

    pub fn set_status(&mut self, user: &str, status: CompetitorStatus) -> Result<(), ProcessorError> {
        let competitor = self
            .competitors
            .get_mut(user)
            .ok_or_else(|| ProcessorError::UnknownCompetitor(user.to_string()))?;
        competitor.status = status;

        Ok(())
    }

    /// Removes a competitor outright, including their entries in every
    /// registry participant set. Requires a follow-up recalculation.
    pub fn remove_competitor(&mut self, user: &str) -> Result<(), ProcessorError> {
        if self.competitors.shift_remove(user).is_none() {
            return Err(ProcessorError::UnknownCompetitor(user.to_string()));
        }

        for event in self.processed_contests.values_mut() {
            event.participants.remove(user);
        }

        Ok(())
    }

    /// Deletes an event: its registry entry, every competitor's performance
    /// in it, and its upsolving contributions. Requires a follow-up
    /// recalculation.
    pub fn delete_event(&mut self, event_id: &str) -> Result<(), ProcessorError> {
        let Some(removed) = self.processed_contests.shift_remove(event_id) else {
            return Err(ProcessorError::UnknownEvent(event_id.to_string()));
        };

        for competitor in self.competitors.values_mut() {
            if competitor.performances_mut(removed.kind).shift_remove(event_id).is_some() {
                match removed.kind {
                    EventKind::Contest => competitor.contests_participated -= 1,
                    EventKind::Homework => competitor.homeworks_participated -= 1
                }
            }

            if let Some(upsolved) = competitor.upsolving_by_event.shift_remove(event_id) {
                competitor.total_upsolving -= upsolved;
            }
        }

        Ok(())
    }

    /// Standings view: blacklisted competitors hidden, minimum-participation
    /// gate applied, sorted by final score descending (stable, so equal
    /// scores keep registration order).
    pub fn standings(&self) -> Vec<&CompetitorData> {
        self.competitors
            .values()
            .filter(|competitor| competitor.status != CompetitorStatus::Blacklisted)
            .filter(|competitor| competitor.is_eligible(&self.config))
            .sorted_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap())
            .collect()
    }
}
