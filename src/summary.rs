//! # Summary — Residue Coverage Statistics
//!
//! Derived, read-only view of a finished sequence: how many distinct values it
//! holds and which residues in `[0, M)` it never produces.
//!
//! ## Unreduced seeds
//!
//! Seed terms are stored exactly as given, and the statistics are taken over
//! the stored values. Two consequences follow:
//!
//! - `distinct_count` counts raw values, so a seed of 105 and a generated
//!   residue of 4 (mod 101) count as two values.
//! - A seed term only removes a residue from `missing` when the seed itself
//!   lies in `[0, M)`. Seed 105 does not cover residue 4.

use rug::Integer;
use serde::Serialize;
use std::collections::HashSet;

use crate::engine::Modulus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of distinct stored values in the sequence.
    #[serde(rename = "distinctResidueCount")]
    pub distinct_count: usize,
    /// Residues in `[0, modulus)` absent from the sequence, ascending.
    #[serde(rename = "missingResidues")]
    pub missing: Vec<u64>,
    pub modulus: Modulus,
}

pub fn summarize(sequence: &[Integer], modulus: Modulus) -> Summary {
    let distinct: HashSet<&Integer> = sequence.iter().collect();

    let m = modulus.get();
    let present: HashSet<u64> = sequence
        .iter()
        .filter_map(|v| v.to_u64())
        .filter(|&v| v < m)
        .collect();
    let missing = (0..m).filter(|r| !present.contains(r)).collect();

    Summary {
        distinct_count: distinct.len(),
        missing,
        modulus,
    }
}
