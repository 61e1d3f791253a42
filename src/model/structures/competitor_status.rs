use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Administrative standing of a competitor. Blacklisted competitors keep
/// their ledger entries but are hidden from standings; guests are shown but
/// compete out of classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitorStatus {
    #[default]
    Active,
    Blacklisted,
    Guest
}

impl CompetitorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitorStatus::Active => "active",
            CompetitorStatus::Blacklisted => "blacklisted",
            CompetitorStatus::Guest => "guest"
        }
    }
}

impl std::fmt::Display for CompetitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompetitorStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(CompetitorStatus::Active),
            "blacklisted" => Ok(CompetitorStatus::Blacklisted),
            "guest" => Ok(CompetitorStatus::Guest),
            _ => Err(())
        }
    }
}
