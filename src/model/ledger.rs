use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::{
    constants,
    error::ProcessorError,
    structures::{competitor_status::CompetitorStatus, event_kind::EventKind}
};

/// Scoring parameters for the whole ledger, serialized with it. One
/// instance per run, owned by the rating system and passed by reference
/// into every calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub contest_base_weight: f64,
    pub contest_growth_period: i32,
    pub contest_bonus_top_n: i32,
    pub contest_bonus_max: f64,
    pub homework_base_weight: f64,
    pub homework_growth_period: i32,
    pub homework_bonus_top_n: i32,
    pub homework_bonus_max: f64,
    pub upsolving_points_per_problem: f64,
    pub min_contests_required: i32,
    pub min_homeworks_required: i32
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            contest_base_weight: constants::CONTEST_BASE_WEIGHT,
            contest_growth_period: constants::CONTEST_GROWTH_PERIOD,
            contest_bonus_top_n: constants::CONTEST_BONUS_TOP_N,
            contest_bonus_max: constants::CONTEST_BONUS_MAX,
            homework_base_weight: constants::HOMEWORK_BASE_WEIGHT,
            homework_growth_period: constants::HOMEWORK_GROWTH_PERIOD,
            homework_bonus_top_n: constants::HOMEWORK_BONUS_TOP_N,
            homework_bonus_max: constants::HOMEWORK_BONUS_MAX,
            upsolving_points_per_problem: constants::UPSOLVING_POINTS_PER_PROBLEM,
            min_contests_required: constants::MIN_CONTESTS_REQUIRED,
            min_homeworks_required: constants::MIN_HOMEWORKS_REQUIRED
        }
    }
}

/// The per-kind slice of the config that the formulas consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindWeights {
    pub base_weight: f64,
    pub growth_period: i32,
    pub bonus_top_n: i32,
    pub bonus_max: f64
}

impl ScoringConfig {
    pub fn weights(&self, kind: EventKind) -> KindWeights {
        match kind {
            EventKind::Contest => KindWeights {
                base_weight: self.contest_base_weight,
                growth_period: self.contest_growth_period,
                bonus_top_n: self.contest_bonus_top_n,
                bonus_max: self.contest_bonus_max
            },
            EventKind::Homework => KindWeights {
                base_weight: self.homework_base_weight,
                growth_period: self.homework_growth_period,
                bonus_top_n: self.homework_bonus_top_n,
                bonus_max: self.homework_bonus_max
            }
        }
    }

    /// Named-parameter edit surface. Weights and bonuses must be
    /// non-negative; growth periods accept any value because a period of
    /// zero or less degenerates to a constant multiplier rather than an
    /// error.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ProcessorError> {
        match name {
            "contest-base-weight" => self.contest_base_weight = parse_weight(name, value)?,
            "contest-growth-period" => self.contest_growth_period = parse_int(name, value)?,
            "contest-bonus-top-n" => self.contest_bonus_top_n = parse_count(name, value)?,
            "contest-bonus-max" => self.contest_bonus_max = parse_weight(name, value)?,
            "homework-base-weight" => self.homework_base_weight = parse_weight(name, value)?,
            "homework-growth-period" => self.homework_growth_period = parse_int(name, value)?,
            "homework-bonus-top-n" => self.homework_bonus_top_n = parse_count(name, value)?,
            "homework-bonus-max" => self.homework_bonus_max = parse_weight(name, value)?,
            "upsolving-points" => self.upsolving_points_per_problem = parse_weight(name, value)?,
            "min-contests" => self.min_contests_required = parse_count(name, value)?,
            "min-homeworks" => self.min_homeworks_required = parse_count(name, value)?,
            _ => return Err(ProcessorError::UnknownParameter(name.to_string()))
        }

        Ok(())
    }

    /// Parameter names accepted by [`ScoringConfig::set`], in display order.
    pub fn parameter_names() -> &'static [&'static str] {
        &[
            "contest-base-weight",
            "contest-growth-period",
            "contest-bonus-top-n",
            "contest-bonus-max",
            "homework-base-weight",
            "homework-growth-period",
            "homework-bonus-top-n",
            "homework-bonus-max",
            "upsolving-points",
            "min-contests",
            "min-homeworks"
        ]
    }
}

fn parse_weight(name: &str, value: &str) -> Result<f64, ProcessorError> {
    let parsed: f64 = value.parse().map_err(|_| invalid(name, value, "not a number"))?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(invalid(name, value, "must be a non-negative number"));
    }

    Ok(parsed)
}

fn parse_int(name: &str, value: &str) -> Result<i32, ProcessorError> {
    value.parse().map_err(|_| invalid(name, value, "not an integer"))
}

fn parse_count(name: &str, value: &str) -> Result<i32, ProcessorError> {
    let parsed = parse_int(name, value)?;
    if parsed < 0 {
        return Err(invalid(name, value, "must be zero or more"));
    }

    Ok(parsed)
}

fn invalid(name: &str, value: &str, reason: &str) -> ProcessorError {
    ProcessorError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string()
    }
}

/// One competitor's result in one event. `points_earned` is computed once,
/// at first ingestion, and only changes through the explicit replay
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContestPerformance {
    pub problems_solved: i32,
    pub rank: i32,
    pub total_participants: i32,
    pub max_problems_solved: i32,
    pub points_earned: f64
}

/// Registry entry for an event that has been ingested at least once.
/// Created on first ingestion, updated in place on re-submission;
/// `first_processed_date` and `chronological_index` never change on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedContest {
    pub event_id: String,
    pub kind: EventKind,
    pub duration_minutes: i32,
    pub first_processed_date: NaiveDate,
    pub last_updated_date: NaiveDate,
    pub participants: BTreeSet<String>,
    pub total_participants: i32,
    pub max_problems_solved: i32,
    pub chronological_index: i32
}

/// Everything the ledger knows about one competitor. The performance maps
/// hold value copies, keyed by event id; nothing here aliases registry
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorData {
    pub user_name: String,
    pub team_name: String,
    #[serde(default)]
    pub status: CompetitorStatus,
    pub contests: IndexMap<String, ContestPerformance>,
    pub homeworks: IndexMap<String, ContestPerformance>,
    pub upsolving_by_event: IndexMap<String, i32>,
    pub total_upsolving: i32,
    pub total_contest_points: f64,
    pub total_homework_points: f64,
    pub total_upsolving_points: f64,
    pub final_score: f64,
    pub contests_participated: i32,
    pub homeworks_participated: i32
}

impl CompetitorData {
    pub fn new(user_name: &str, team_name: &str) -> Self {
        CompetitorData {
            user_name: user_name.to_string(),
            team_name: team_name.to_string(),
            status: CompetitorStatus::default(),
            contests: IndexMap::new(),
            homeworks: IndexMap::new(),
            upsolving_by_event: IndexMap::new(),
            total_upsolving: 0,
            total_contest_points: 0.0,
            total_homework_points: 0.0,
            total_upsolving_points: 0.0,
            final_score: 0.0,
            contests_participated: 0,
            homeworks_participated: 0
        }
    }

    pub fn performances(&self, kind: EventKind) -> &IndexMap<String, ContestPerformance> {
        match kind {
            EventKind::Contest => &self.contests,
            EventKind::Homework => &self.homeworks
        }
    }

    pub fn performances_mut(&mut self, kind: EventKind) -> &mut IndexMap<String, ContestPerformance> {
        match kind {
            EventKind::Contest => &mut self.contests,
            EventKind::Homework => &mut self.homeworks
        }
    }

    pub fn bump_participation(&mut self, kind: EventKind) {
        match kind {
            EventKind::Contest => self.contests_participated += 1,
            EventKind::Homework => self.homeworks_participated += 1
        }
    }

    /// Minimum-participation gate for the standings. Never affects scoring,
    /// only whether the competitor shows up in ranked output.
    pub fn is_eligible(&self, config: &ScoringConfig) -> bool {
        self.contests_participated >= config.min_contests_required
            && self.homeworks_participated >= config.min_homeworks_required
    }
}
