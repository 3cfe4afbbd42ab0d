//! # Error — Input Validation Failures
//!
//! Every failure the engine can report is a deterministic input-validation
//! failure detected before the first generation step runs. Nothing here is
//! transient, so nothing is retried: front ends show the message and withhold
//! the trace and summary.
//!
//! `kind()` gives each variant a stable snake_case tag. The HTTP service puts
//! it next to the message in 400 responses so clients can branch without
//! parsing prose.

use thiserror::Error;

/// Why a recurrence request was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A non-empty initial-term token is not a signed decimal integer.
    #[error("invalid initial term '{token}' at position {position}: expected a signed integer")]
    Parse { token: String, position: usize },

    #[error("modulus must be at least 2, got {modulus}")]
    InvalidModulus { modulus: i64 },

    /// The recurrence reads three predecessors, so three seeds are the minimum.
    #[error("at least 3 initial terms are required, got {count}")]
    InsufficientSeed { count: usize },

    #[error("term count must be non-negative, got {term_count}")]
    NegativeTermCount { term_count: i64 },

    #[error("term count {requested} exceeds the limit of {limit}")]
    TermLimitExceeded { requested: u64, limit: u64 },

    #[error("modulus {requested} exceeds the limit of {limit}")]
    ModulusLimitExceeded { requested: u64, limit: u64 },
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Parse { .. } => "parse_error",
            EngineError::InvalidModulus { .. } => "invalid_modulus",
            EngineError::InsufficientSeed { .. } => "insufficient_seed",
            EngineError::NegativeTermCount { .. } => "negative_term_count",
            EngineError::TermLimitExceeded { .. } => "term_limit_exceeded",
            EngineError::ModulusLimitExceeded { .. } => "modulus_limit_exceeded",
        }
    }
}
