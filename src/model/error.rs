use thiserror::Error;

use crate::model::structures::event_kind::EventKind;

/// Input-side failures. None of these are fatal to the process and none
/// leave the ledger partially mutated: every variant is raised before the
/// first write, or by an operation that has not touched the maps yet.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("failed to read scoreboard: {0}")]
    Io(#[from] std::io::Error),

    #[error("scoreboard is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("row {row}: neither user_name nor team_name is present")]
    MissingIdentity { row: usize },

    #[error("row {row}: problem {problem:?} has malformed solve time {value:?}")]
    BadSolveTime {
        row: usize,
        problem: String,
        value: String
    },

    #[error("invalid event kind {0:?}, expected \"contest\" or \"homework\"")]
    InvalidKind(String),

    #[error("event {event_id:?} was processed as {stored}, refusing to reprocess as {supplied}")]
    KindMismatch {
        event_id: String,
        stored: EventKind,
        supplied: EventKind
    },

    #[error("unknown configuration parameter {0:?}")]
    UnknownParameter(String),

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String
    },

    #[error("unknown competitor {0:?}")]
    UnknownCompetitor(String),

    #[error("unknown event {0:?}")]
    UnknownEvent(String)
}
