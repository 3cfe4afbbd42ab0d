//! # Engine — Sequence Generation and the Request Pipeline
//!
//! Generates the sequence `f` term by term from a seed and a
//! [`RecurrenceRule`], reducing every *generated* term modulo M while leaving
//! the seed terms exactly as given, and records one [`TraceEntry`] per step.
//!
//! ## Validation
//!
//! All preconditions are checked before the first step runs, in this order:
//!
//! | Check | Error |
//! |-------|-------|
//! | modulus >= 2 | `InvalidModulus` |
//! | modulus <= `Limits::max_modulus` | `ModulusLimitExceeded` |
//! | term count >= 0 | `NegativeTermCount` |
//! | term count <= `Limits::max_terms` | `TermLimitExceeded` |
//! | at least 3 seed terms | `InsufficientSeed` |
//!
//! A failed check never leaves a partial trace behind.
//!
//! ## Reduction
//!
//! Raw values are reduced with Euclidean remainder (`rem_euc`), so negative raw
//! values still land in `[0, M)`: `-19 mod 5 = 1`, not `-4`.
//!
//! ## Request pipeline
//!
//! [`Engine::compute`] is the single call front ends make: parse the seed
//! text, generate, summarize. It holds no state between calls; the CLI and the
//! HTTP service each issue one call per request and keep the result
//! themselves.

use rug::ops::RemRounding;
use rug::Integer;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::EngineError;
use crate::parse::parse_initial_terms;
use crate::rule::{RecurrenceRule, SquareMinusProduct};
use crate::summary::{summarize, Summary};

/// Number of predecessors the recurrence reads.
pub const MIN_SEED_TERMS: usize = 3;

/// A validated modulus (>= 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Modulus(u64);

impl Modulus {
    pub fn new(modulus: i64) -> Result<Self, EngineError> {
        if modulus < 2 {
            return Err(EngineError::InvalidModulus { modulus });
        }
        Ok(Modulus(modulus as u64))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Modulus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upper bounds on the work one request may cause.
///
/// `max_modulus` also bounds the response: the summary lists every missing
/// residue, so its length grows with the modulus rather than the term count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_terms: u64,
    pub max_modulus: u64,
}

impl Limits {
    pub const DEFAULT_MAX_TERMS: u64 = 100_000;
    pub const DEFAULT_MAX_MODULUS: u64 = 100_000;

    /// No bounds beyond what the input types can express.
    pub fn unbounded() -> Self {
        Limits {
            max_terms: u64::MAX,
            max_modulus: u64::MAX,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_terms: Self::DEFAULT_MAX_TERMS,
            max_modulus: Self::DEFAULT_MAX_MODULUS,
        }
    }
}

/// One generation step: `f[index] = raw mod M`, computed from `a, b, c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub index: usize,
    /// f[index-3]
    #[serde(serialize_with = "serialize_integer")]
    pub a: Integer,
    /// f[index-2]
    #[serde(serialize_with = "serialize_integer")]
    pub b: Integer,
    /// f[index-1]
    #[serde(serialize_with = "serialize_integer")]
    pub c: Integer,
    #[serde(serialize_with = "serialize_integer")]
    pub raw: Integer,
    #[serde(serialize_with = "serialize_integer")]
    pub modded: Integer,
}

/// Output of [`Engine::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Seed terms unreduced, followed by every generated residue.
    pub sequence: Vec<Integer>,
    /// One entry per generated index, in increasing index order.
    pub trace: Vec<TraceEntry>,
    pub modulus: Modulus,
}

/// Seed terms as a front end hands them over: raw text or an already-split list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialTermsInput {
    Text(String),
    List(Vec<i64>),
}

impl From<&str> for InitialTermsInput {
    fn from(text: &str) -> Self {
        InitialTermsInput::Text(text.to_string())
    }
}

/// One "compute" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRequest {
    pub modulus: i64,
    pub term_count: i64,
    #[serde(alias = "initialTermsText")]
    pub initial_terms: InitialTermsInput,
}

/// Everything a front end renders for one successful request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Computation {
    pub trace: Vec<TraceEntry>,
    pub summary: Summary,
    #[serde(serialize_with = "serialize_integers")]
    pub sequence: Vec<Integer>,
}

/// Recurrence evaluator: a rule plus the limits it enforces.
#[derive(Debug, Clone)]
pub struct Engine<R = SquareMinusProduct> {
    rule: R,
    limits: Limits,
}

impl Engine<SquareMinusProduct> {
    pub fn new() -> Self {
        Engine::with_rule(SquareMinusProduct)
    }
}

impl Default for Engine<SquareMinusProduct> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RecurrenceRule> Engine<R> {
    pub fn with_rule(rule: R) -> Self {
        Engine {
            rule,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Check every precondition of [`Engine::generate`] without generating.
    /// Returns the term count as a length and the validated modulus.
    pub fn validate(
        &self,
        seed_len: usize,
        term_count: i64,
        modulus: i64,
    ) -> Result<(usize, Modulus), EngineError> {
        let modulus = Modulus::new(modulus)?;
        if modulus.get() > self.limits.max_modulus {
            return Err(EngineError::ModulusLimitExceeded {
                requested: modulus.get(),
                limit: self.limits.max_modulus,
            });
        }
        if term_count < 0 {
            return Err(EngineError::NegativeTermCount { term_count });
        }
        if term_count as u64 > self.limits.max_terms {
            return Err(EngineError::TermLimitExceeded {
                requested: term_count as u64,
                limit: self.limits.max_terms,
            });
        }
        if seed_len < MIN_SEED_TERMS {
            return Err(EngineError::InsufficientSeed { count: seed_len });
        }
        let term_count = usize::try_from(term_count).map_err(|_| EngineError::TermLimitExceeded {
            requested: term_count as u64,
            limit: usize::MAX as u64,
        })?;
        Ok((term_count, modulus))
    }

    /// Generate the sequence up to `term_count` terms.
    ///
    /// Indices below `initial.len()` hold the seed terms unreduced; every later
    /// index holds `rule(f[i-3], f[i-2], f[i-1]) mod modulus`. When
    /// `term_count <= initial.len()` the loop does not run: the sequence is
    /// the seed and the trace is empty.
    pub fn generate(
        &self,
        initial: &[Integer],
        term_count: i64,
        modulus: i64,
    ) -> Result<Generation, EngineError> {
        let (term_count, modulus) = self.validate(initial.len(), term_count, modulus)?;
        let m = Integer::from(modulus.get());

        let mut sequence = initial.to_vec();
        let mut trace = Vec::with_capacity(term_count.saturating_sub(initial.len()));
        for index in initial.len()..term_count {
            let (a, b, c) = (
                &sequence[index - 3],
                &sequence[index - 2],
                &sequence[index - 1],
            );
            let raw = self.rule.next(a, b, c);
            let modded = raw.clone().rem_euc(&m);
            trace.push(TraceEntry {
                index,
                a: a.clone(),
                b: b.clone(),
                c: c.clone(),
                raw,
                modded: modded.clone(),
            });
            sequence.push(modded);
        }

        debug!(
            modulus = modulus.get(),
            seeds = initial.len(),
            steps = trace.len(),
            rule = self.rule.formula(),
            "sequence generated"
        );
        Ok(Generation {
            sequence,
            trace,
            modulus,
        })
    }

    /// Parse, validate, generate and summarize one request.
    pub fn compute(&self, request: &ComputeRequest) -> Result<Computation, EngineError> {
        let initial = match &request.initial_terms {
            InitialTermsInput::Text(text) => parse_initial_terms(text)?,
            InitialTermsInput::List(values) => values.iter().map(|&v| Integer::from(v)).collect(),
        };
        let generation = self.generate(&initial, request.term_count, request.modulus)?;
        let summary = summarize(&generation.sequence, generation.modulus);
        Ok(Computation {
            trace: generation.trace,
            summary,
            sequence: generation.sequence,
        })
    }
}

/// Integers go out as JSON numbers while they fit in an i64 and as decimal
/// strings beyond that.
fn serialize_integer<S: Serializer>(value: &Integer, serializer: S) -> Result<S::Ok, S::Error> {
    match value.to_i64() {
        Some(v) => serializer.serialize_i64(v),
        None => serializer.collect_str(value),
    }
}

fn serialize_integers<S: Serializer>(
    values: &[Integer],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    struct Wire<'a>(&'a Integer);

    impl Serialize for Wire<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_integer(self.0, serializer)
        }
    }

    serializer.collect_seq(values.iter().map(Wire))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Integer> {
        values.iter().map(|&v| Integer::from(v)).collect()
    }

    // ── Generation ──────────────────────────────────────────────────

    #[test]
    fn reference_scenario_mod_101() {
        let g = Engine::new().generate(&ints(&[1, 2, 3]), 6, 101).unwrap();
        assert_eq!(g.sequence, ints(&[1, 2, 3, 7, 43, 10]));
        assert_eq!(g.trace.len(), 3);

        let t = &g.trace[0];
        assert_eq!((t.index, t.a.clone(), t.b.clone(), t.c.clone()), (3, 1.into(), 2.into(), 3.into()));
        assert_eq!(t.raw, 7);
        assert_eq!(t.modded, 7);

        assert_eq!(g.trace[1].index, 4);
        assert_eq!(g.trace[1].raw, 43);
        assert_eq!(g.trace[1].modded, 43);

        let last = &g.trace[2];
        assert_eq!(last.index, 5);
        assert_eq!((last.a.clone(), last.b.clone(), last.c.clone()), (3.into(), 7.into(), 43.into()));
        assert_eq!(last.raw, 1828);
        assert_eq!(last.modded, 10);
    }

    #[test]
    fn negative_raw_reduces_to_non_negative_residue() {
        // 1^2 - 5*4 = -19, and -19 mod 5 = 1
        let g = Engine::new().generate(&ints(&[4, 5, 1]), 4, 5).unwrap();
        assert_eq!(g.trace[0].raw, -19);
        assert_eq!(g.trace[0].modded, 1);
    }

    #[test]
    fn seed_terms_stay_unreduced() {
        let g = Engine::new().generate(&ints(&[500, -3, 202]), 5, 7).unwrap();
        assert_eq!(&g.sequence[..3], &ints(&[500, -3, 202])[..]);
        for v in &g.sequence[3..] {
            assert!(*v >= 0 && *v < 7);
        }
    }

    #[test]
    fn later_steps_read_reduced_predecessors() {
        let g = Engine::new().generate(&ints(&[1, 2, 3]), 7, 101).unwrap();
        // f[6] = 10^2 - 43*7 = -201, -201 mod 101 = 1
        let t = &g.trace[3];
        assert_eq!((t.a.clone(), t.b.clone(), t.c.clone()), (7.into(), 43.into(), 10.into()));
        assert_eq!(t.raw, -201);
        assert_eq!(t.modded, 1);
    }

    #[test]
    fn term_count_at_or_below_seed_length_yields_empty_trace() {
        for n in [0, 1, 3] {
            let g = Engine::new().generate(&ints(&[9, 8, 7]), n, 11).unwrap();
            assert!(g.trace.is_empty());
            assert_eq!(g.sequence, ints(&[9, 8, 7]));
        }
    }

    #[test]
    fn longer_seed_starts_generation_after_seed() {
        let g = Engine::new().generate(&ints(&[1, 1, 1, 1, 2]), 7, 1000).unwrap();
        assert_eq!(g.trace[0].index, 5);
        // 2^2 - 1*1
        assert_eq!(g.trace[0].raw, 3);
        assert_eq!(g.sequence.len(), 7);
    }

    #[test]
    fn custom_rule_replaces_default() {
        let fib3 = |a: &Integer, b: &Integer, c: &Integer| Integer::from(a + b) + c;
        let g = Engine::with_rule(fib3)
            .generate(&ints(&[0, 0, 1]), 8, 1_000)
            .unwrap();
        assert_eq!(g.sequence, ints(&[0, 0, 1, 1, 2, 4, 7, 13]));
    }

    // ── Validation ──────────────────────────────────────────────────

    #[test]
    fn rejects_small_modulus() {
        for m in [1, 0, -5] {
            assert_eq!(
                Engine::new().generate(&ints(&[1, 2, 3]), 5, m),
                Err(EngineError::InvalidModulus { modulus: m })
            );
        }
    }

    #[test]
    fn rejects_short_seed_instead_of_indexing_out_of_bounds() {
        for seed in [vec![], ints(&[1]), ints(&[1, 2])] {
            assert_eq!(
                Engine::new().generate(&seed, 10, 7),
                Err(EngineError::InsufficientSeed { count: seed.len() })
            );
        }
    }

    #[test]
    fn short_seed_rejected_even_without_new_terms() {
        assert_eq!(
            Engine::new().generate(&ints(&[1, 2]), 0, 7),
            Err(EngineError::InsufficientSeed { count: 2 })
        );
    }

    #[test]
    fn rejects_negative_term_count() {
        assert_eq!(
            Engine::new().generate(&ints(&[1, 2, 3]), -1, 7),
            Err(EngineError::NegativeTermCount { term_count: -1 })
        );
    }

    #[test]
    fn modulus_checked_before_seed() {
        assert_eq!(
            Engine::new().generate(&ints(&[1]), -1, 1),
            Err(EngineError::InvalidModulus { modulus: 1 })
        );
    }

    #[test]
    fn limits_are_enforced() {
        let engine = Engine::new().with_limits(Limits {
            max_terms: 10,
            max_modulus: 50,
        });
        assert_eq!(
            engine.generate(&ints(&[1, 2, 3]), 11, 7),
            Err(EngineError::TermLimitExceeded {
                requested: 11,
                limit: 10
            })
        );
        assert_eq!(
            engine.generate(&ints(&[1, 2, 3]), 5, 51),
            Err(EngineError::ModulusLimitExceeded {
                requested: 51,
                limit: 50
            })
        );
        assert!(engine.generate(&ints(&[1, 2, 3]), 10, 50).is_ok());
    }

    #[test]
    fn default_modulus_limit_boundary() {
        let engine = Engine::new();
        assert!(engine.validate(3, 3, 100_000).is_ok());
        assert_eq!(
            engine.validate(3, 3, 100_001),
            Err(EngineError::ModulusLimitExceeded {
                requested: 100_001,
                limit: Limits::DEFAULT_MAX_MODULUS
            })
        );
    }

    #[test]
    fn unbounded_limits_accept_large_requests() {
        let engine = Engine::new().with_limits(Limits::unbounded());
        assert!(engine.validate(3, 1_000_000, i64::MAX).is_ok());
    }

    // ── Request pipeline ────────────────────────────────────────────

    #[test]
    fn compute_from_text() {
        let request = ComputeRequest {
            modulus: 101,
            term_count: 6,
            initial_terms: "1, 2,3 ".into(),
        };
        let c = Engine::new().compute(&request).unwrap();
        assert_eq!(c.sequence, ints(&[1, 2, 3, 7, 43, 10]));
        assert_eq!(c.summary.distinct_count, 6);
        assert_eq!(c.summary.missing.len(), 95);
    }

    #[test]
    fn compute_from_list() {
        let request = ComputeRequest {
            modulus: 101,
            term_count: 6,
            initial_terms: InitialTermsInput::List(vec![1, 2, 3]),
        };
        let c = Engine::new().compute(&request).unwrap();
        assert_eq!(c.trace.len(), 3);
    }

    #[test]
    fn compute_surfaces_parse_errors() {
        let request = ComputeRequest {
            modulus: 101,
            term_count: 6,
            initial_terms: "1,x,3".into(),
        };
        assert!(matches!(
            Engine::new().compute(&request),
            Err(EngineError::Parse { .. })
        ));
    }

    #[test]
    fn request_json_uses_camel_case() {
        let request: ComputeRequest = serde_json::from_str(
            r#"{"modulus": 101, "termCount": 300, "initialTerms": "1,2,3"}"#,
        )
        .unwrap();
        assert_eq!(request.term_count, 300);
        assert_eq!(request.initial_terms, InitialTermsInput::Text("1,2,3".into()));

        let request: ComputeRequest = serde_json::from_str(
            r#"{"modulus": 7, "termCount": 5, "initialTermsText": "4,5,6"}"#,
        )
        .unwrap();
        assert_eq!(request.initial_terms, InitialTermsInput::Text("4,5,6".into()));

        let request: ComputeRequest = serde_json::from_str(
            r#"{"modulus": 7, "termCount": 5, "initialTerms": [4, -5, 6]}"#,
        )
        .unwrap();
        assert_eq!(request.initial_terms, InitialTermsInput::List(vec![4, -5, 6]));
    }

    #[test]
    fn big_integers_serialize_as_strings() {
        let seed = vec![
            Integer::from(1),
            Integer::from(2),
            Integer::from_str_radix("100000000000000000000", 10).unwrap(),
        ];
        let g = Engine::new().generate(&seed, 4, 97).unwrap();
        let json = serde_json::to_value(&g.trace[0]).unwrap();
        assert_eq!(json["a"], 1);
        assert_eq!(json["c"], "100000000000000000000");
        assert_eq!(json["raw"], "9999999999999999999999999999999999999998");
        assert!(json["modded"].is_u64());
    }
}
