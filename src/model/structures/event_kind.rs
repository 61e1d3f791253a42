use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::EnumIter;

/// The two kinds of scored events. Contests are the timed Saturday rounds,
/// homeworks are the weekly problem sets. Each kind keeps its own
/// chronological index sequence and its own scoring weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Contest,
    Homework
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Contest => "contest",
            EventKind::Homework => "homework"
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contest" => Ok(EventKind::Contest),
            "homework" => Ok(EventKind::Homework),
            _ => Err(())
        }
    }
}
