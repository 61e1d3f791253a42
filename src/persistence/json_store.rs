use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{
    ledger::{CompetitorData, ProcessedContest, ScoringConfig},
    rating_system::RatingSystem
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access ledger file: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error)
}

/// The persisted shape of the whole ledger: one JSON document with three
/// top-level sections. Exactly what the engine owns in memory, so loads and
/// saves round-trip without translation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default)]
    pub config: ScoringConfig,
    #[serde(default)]
    pub competitors: IndexMap<String, CompetitorData>,
    #[serde(default)]
    pub processed_contests: IndexMap<String, ProcessedContest>
}

impl From<&RatingSystem> for LedgerDocument {
    fn from(system: &RatingSystem) -> Self {
        LedgerDocument {
            config: system.config().clone(),
            competitors: system.competitors().clone(),
            processed_contests: system.processed_contests().clone()
        }
    }
}

impl LedgerDocument {
    pub fn into_rating_system(self) -> RatingSystem {
        RatingSystem::from_parts(self.config, self.competitors, self.processed_contests)
    }
}

/// Loads and saves the ledger as a single pretty-printed JSON file. The
/// store never retains a copy of the data; it serializes whatever the
/// rating system hands it.
pub struct JsonLedgerStore {
    path: PathBuf
}

impl JsonLedgerStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonLedgerStore { path: path.into() }
    }

    pub fn load(&self) -> Result<LedgerDocument, StoreError> {
        let content = fs::read_to_string(&self.path)?;
        let document = serde_json::from_str(&content)?;

        Ok(document)
    }

    /// A missing or corrupt ledger degrades to an empty one so a run can
    /// always start; the condition is logged, never swallowed silently.
    pub fn load_or_empty(&self) -> LedgerDocument {
        match self.load() {
            Ok(document) => {
                info!(
                    path = %self.path.display(),
                    competitors = document.competitors.len(),
                    events = document.processed_contests.len(),
                    "loaded ledger"
                );
                document
            }
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "ledger file not found, starting with an empty ledger");
                LedgerDocument::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), "failed to load ledger ({e}), starting with an empty ledger");
                LedgerDocument::default()
            }
        }
    }

    pub fn save(&self, document: &LedgerDocument) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, content)?;

        info!(
            path = %self.path.display(),
            competitors = document.competitors.len(),
            events = document.processed_contests.len(),
            "saved ledger"
        );

        Ok(())
    }
}
