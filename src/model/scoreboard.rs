use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::model::error::ProcessorError;

/// One raw scoreboard row as emitted by the spreadsheet converter.
///
/// `user_name` may be null for single-member teams; identity then falls back
/// to `team_name`. `score` is the judge's total solved count, including
/// problems solved after the window closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    pub score: i32,
    pub penalty: i64,
    pub problems: IndexMap<String, ProblemCell>
}

/// Per-problem cell. The converter also emits attempt counters; they are
/// carried through round-trips but the engine only reads `solved` and `time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemCell {
    pub solved: bool,
    pub time: Option<String>,
    #[serde(default)]
    pub penalty_attempts: i32,
    #[serde(default)]
    pub total_attempts: i32
}

impl RawEntry {
    /// Identity key: user name, falling back to team name. None when the
    /// row carries neither (an ingestion failure upstream).
    pub fn identity(&self) -> Option<&str> {
        self.user_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.team_name.as_deref().filter(|name| !name.is_empty()))
    }
}

/// Parses an `"H:MM:SS"` solve time into whole minutes from the contest
/// start. Seconds are discarded, matching how penalties are bookkept.
pub fn parse_solve_time(value: &str) -> Option<i32> {
    let mut fields = value.split(':');

    let hours: i32 = fields.next()?.trim().parse().ok()?;
    let minutes: i32 = fields.next()?.trim().parse().ok()?;
    let seconds: i32 = fields.next()?.trim().parse().ok()?;

    if fields.next().is_some() {
        return None;
    }
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }

    Some(hours * 60 + minutes)
}

/// Loads a raw scoreboard file. Anything other than a well-formed JSON array
/// of entries is an input error; nothing is ever partially accepted.
pub fn load_scoreboard(path: &Path) -> Result<Vec<RawEntry>, ProcessorError> {
    let content = fs::read_to_string(path)?;
    let entries = serde_json::from_str(&content)?;

    Ok(entries)
}
