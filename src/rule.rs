//! # Rule — Three-Term Recurrence Functions
//!
//! A rule maps the three preceding terms `(a, b, c) = (f[n-3], f[n-2], f[n-1])`
//! to the unreduced next term. The generation loop in [`crate::engine`] only
//! ever talks to [`RecurrenceRule`], so a different polynomial can be plugged
//! in without touching the loop or the reduction step.
//!
//! The default rule is [`SquareMinusProduct`]: `f[n] = f[n-1]^2 - f[n-2]*f[n-3]`.
//!
//! Closures of the right shape are rules too:
//!
//! ```
//! use recurrence_explorer::rule::RecurrenceRule;
//! use rug::Integer;
//!
//! let tribonacci = |a: &Integer, b: &Integer, c: &Integer| Integer::from(a + b) + c;
//! let next = tribonacci.next(&Integer::from(1), &Integer::from(1), &Integer::from(2));
//! assert_eq!(next, 4);
//! ```

use rug::Integer;

/// A pure function of the three preceding terms.
///
/// Implementations must be deterministic: identical inputs always yield the
/// identical unreduced value. Reduction modulo M happens in the engine.
pub trait RecurrenceRule: Send + Sync {
    fn next(&self, a: &Integer, b: &Integer, c: &Integer) -> Integer;

    /// Human-readable formula, used in logs and report headers.
    fn formula(&self) -> &str {
        "custom"
    }
}

/// `c^2 - b*a`, the rule used unless a caller supplies another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquareMinusProduct;

impl RecurrenceRule for SquareMinusProduct {
    fn next(&self, a: &Integer, b: &Integer, c: &Integer) -> Integer {
        Integer::from(c.square_ref()) - Integer::from(b * a)
    }

    fn formula(&self) -> &str {
        "f[n-1]^2 - f[n-2]*f[n-3]"
    }
}

impl<F> RecurrenceRule for F
where
    F: Fn(&Integer, &Integer, &Integer) -> Integer + Send + Sync,
{
    fn next(&self, a: &Integer, b: &Integer, c: &Integer) -> Integer {
        self(a, b, c)
    }
}
