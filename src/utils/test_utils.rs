use chrono::NaiveDate;
use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::scoreboard::{ProblemCell, RawEntry};

/// Fixed processing date used across tests.
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
}

pub fn generate_problem_cell(solved: bool, time: Option<&str>) -> ProblemCell {
    ProblemCell {
        solved,
        time: time.map(|value| value.to_string()),
        penalty_attempts: 0,
        total_attempts: i32::from(solved)
    }
}

fn problem_id(index: usize) -> String {
    if index < 26 {
        ((b'A' + index as u8) as char).to_string()
    } else {
        format!("P{index}")
    }
}

/// Builds one raw entry. `problems` is a (solved, solve-time) pair per
/// problem; `score` is derived as the count of solved cells, matching what
/// the converter emits. An empty team name becomes a null field.
pub fn generate_entry(
    user_name: Option<&str>,
    team_name: &str,
    problems: &[(bool, Option<&str>)],
    penalty: i64
) -> RawEntry {
    let cells: IndexMap<String, ProblemCell> = problems
        .iter()
        .enumerate()
        .map(|(index, (solved, time))| (problem_id(index), generate_problem_cell(*solved, *time)))
        .collect();

    RawEntry {
        user_name: user_name.map(|name| name.to_string()),
        team_name: if team_name.is_empty() {
            None
        } else {
            Some(team_name.to_string())
        },
        score: cells.values().filter(|cell| cell.solved).count() as i32,
        penalty,
        problems: cells
    }
}

/// Generates a reproducible scoreboard: `participants` players over
/// `problems` problems, with solve times spread around the duration cutoff
/// so that both on-time and upsolved problems occur.
pub fn generate_scoreboard(participants: usize, problems: usize, duration_minutes: i32) -> Vec<RawEntry> {
    // Seeded RNG for reproducible results
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut entries = Vec::with_capacity(participants);

    for player in 0..participants {
        let mut cells: Vec<(bool, Option<String>)> = Vec::with_capacity(problems);
        let mut penalty = 0i64;

        for _ in 0..problems {
            if !rng.random_bool(0.6) {
                cells.push((false, None));
                continue;
            }

            let minutes = rng.random_range(10..duration_minutes + duration_minutes / 3);
            cells.push((true, Some(format!("{}:{:02}:00", minutes / 60, minutes % 60))));
            if minutes <= duration_minutes {
                penalty += minutes as i64;
            }
        }

        let pairs: Vec<(bool, Option<&str>)> = cells
            .iter()
            .map(|(solved, time)| (*solved, time.as_deref()))
            .collect();

        entries.push(generate_entry(
            Some(&format!("player_{player}")),
            &format!("team_{player}"),
            &pairs,
            penalty
        ));
    }

    entries
}
