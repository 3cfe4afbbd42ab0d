//! Initial-term parsing for the comma-separated seed text.

use rug::Integer;

use crate::error::EngineError;

/// Parse comma-separated initial terms.
///
/// Tokens are trimmed and empty tokens are dropped, so `"1, 2,3 "` and
/// `"1,,2,3,"` are both fine. Every remaining token must be a signed decimal
/// integer of arbitrary size; single underscores may group digits (`1_000`).
/// Order is preserved; nothing is deduplicated,
/// sorted or reduced.
///
/// `position` in the error is the zero-based index of the bad token among the
/// non-empty ones.
pub fn parse_initial_terms(text: &str) -> Result<Vec<Integer>, EngineError> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(position, token)| parse_term(token, position))
        .collect()
}

fn parse_term(token: &str, position: usize) -> Result<Integer, EngineError> {
    let invalid = || EngineError::Parse {
        token: token.to_string(),
        position,
    };
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    // Each '_' must sit between two digits.
    let well_formed = digits
        .split('_')
        .all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return Err(invalid());
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    let magnitude = Integer::from_str_radix(&cleaned, 10).map_err(|_| invalid())?;
    Ok(if negative { -magnitude } else { magnitude })
}
