//! Error types for the coach_core library.

use chrono::NaiveDate;
use std::fmt;
use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Which persistence call a [`Error::Persistence`] failure came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersistencePhase {
    Delete,
    Insert,
}

impl fmt::Display for PersistencePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistencePhase::Delete => f.write_str("delete"),
            PersistencePhase::Insert => f.write_str("insert"),
        }
    }
}

/// Core error type for coach_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plan definition file error
    #[error("Plan file error: {0}")]
    PlanFile(String),

    /// Schedule data shape disagrees with the declared schedule type
    #[error("Schedule shape mismatch: {0}")]
    ShapeMismatch(String),

    /// End date is not strictly after the start date
    #[error("Invalid date range: end date {end} must be after start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Schedule contains no workouts at all
    #[error("Schedule has no workouts: add at least one workout to the schedule")]
    EmptySchedule,

    /// Plan field validation error
    #[error("Plan validation error: {0}")]
    PlanValidation(String),

    /// No plan with the given id exists
    #[error("Plan not found: {0}")]
    PlanNotFound(Uuid),

    /// A persistence collaborator call failed, tagged with the phase
    #[error("Persistence failure during {phase}: {source}")]
    Persistence {
        phase: PersistencePhase,
        #[source]
        source: Box<Error>,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap a persistence collaborator failure with its phase
    pub fn persistence(phase: PersistencePhase, source: Error) -> Self {
        Error::Persistence {
            phase,
            source: Box::new(source),
        }
    }
}
