//! # Recurrence Explorer
//!
//! Evaluates three-term integer recurrences modulo M and reports the
//! step-by-step trace together with the residue profile of the result.
//!
//! ```
//! use recurrence_explorer::{ComputeRequest, Engine};
//!
//! let request = ComputeRequest {
//!     modulus: 101,
//!     term_count: 6,
//!     initial_terms: "1,2,3".into(),
//! };
//! let result = Engine::new().compute(&request).unwrap();
//! assert_eq!(result.trace[2].raw, 1828);
//! assert_eq!(result.trace[2].modded, 10);
//! assert_eq!(result.summary.distinct_count, 6);
//! ```
//!
//! Seed terms are kept exactly as given; only generated terms are reduced.
//! See [`summary`] for how that shows up in the statistics.

pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod parse;
pub mod prom_metrics;
pub mod report;
pub mod rule;
pub mod summary;

pub use engine::{
    Computation, ComputeRequest, Engine, Generation, InitialTermsInput, Limits, Modulus,
    TraceEntry,
};
pub use error::EngineError;
pub use parse::parse_initial_terms;
pub use rule::{RecurrenceRule, SquareMinusProduct};
pub use summary::{summarize, Summary};
