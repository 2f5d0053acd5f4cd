//! Input checks run before tokenization.
//!
//! Determines whether normalized input uses only the allowed characters, and
//! whether it is a finished expression or one the user is still typing.

use lazy_static::lazy_static;
use regex::Regex;

use super::error::CalcError;

/// Characters that mark an unfinished expression when they end the input.
const TRAILING_INCOMPLETE: &[char] = &['+', '-', '*', '/', '^', '.', '('];

lazy_static! {
    /// Matches strings containing only canonical expression characters.
    /// Allows: digits, whitespace, operators, parentheses, dots, π and
    /// function-name letters.
    static ref ALLOWED_CHARS: Regex = Regex::new(
        r"^[0-9\s\.\+\-\*/\^()a-zA-Z_π]*$"
    ).unwrap();
}

/// How much of the input can be evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification<'a> {
    /// The whole input is a finished expression.
    Complete(&'a str),
    /// The input ends mid-expression. `complete` is the longest prefix without
    /// the unfinished tail, `dropped` is that tail.
    Partial { complete: &'a str, dropped: &'a str },
}

/// Reject any character outside the canonical set.
///
/// Returns the first offending character with its position in the input.
pub fn validate_characters(normalized: &str) -> Result<(), CalcError> {
    if ALLOWED_CHARS.is_match(normalized) {
        return Ok(());
    }

    match normalized
        .chars()
        .enumerate()
        .find(|&(_, c)| !is_allowed(c))
    {
        Some((position, ch)) => Err(CalcError::InvalidCharacter { ch, position }),
        None => Ok(()),
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_digit()
        || c.is_ascii_alphabetic()
        || c.is_whitespace()
        || matches!(c, '.' | '+' | '-' | '*' | '/' | '^' | '(' | ')' | '_' | 'π')
}

/// Split off a trailing operator, decimal point or opening parenthesis.
///
/// Stripping repeats, so `"2*("` yields the prefix `"2"`.
pub fn classify(normalized: &str) -> Classification<'_> {
    let trimmed = normalized.trim_end();
    let complete =
        trimmed.trim_end_matches(|c: char| TRAILING_INCOMPLETE.contains(&c) || c.is_whitespace());

    if complete.len() == trimmed.len() {
        Classification::Complete(trimmed)
    } else {
        Classification::Partial {
            complete,
            dropped: &trimmed[complete.len()..],
        }
    }
}
