//! Word-overlap accuracy of OCR output.
//!
//! The score is a containment ratio: the share of distinct expected words that
//! also appear somewhere in the output. Extra words in the output are never
//! penalized. Cached results depend on this exact definition.

use crate::error::{BenchError, Result};
use std::collections::HashSet;

/// Lowercased distinct words of `text`.
///
/// Words are split on whitespace (line breaks included) and stripped of
/// leading and trailing punctuation; words with nothing left are dropped.
pub fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Share of distinct expected words recovered by `lines`.
///
/// # Errors
///
/// Returns `BenchError::EmptyExpectedText` when `expected` has no words, since
/// the ratio is undefined there.
pub fn success_rate<S: AsRef<str>>(lines: &[S], expected: &str) -> Result<f64> {
    success_rate_for(lines, expected, "")
}

/// Same as [`success_rate`], naming `entry_id` in the error.
pub fn success_rate_for<S: AsRef<str>>(lines: &[S], expected: &str, entry_id: &str) -> Result<f64> {
    let expected_words = word_set(expected);
    if expected_words.is_empty() {
        return Err(BenchError::EmptyExpectedText {
            entry_id: entry_id.to_string(),
        });
    }

    let produced = lines.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
    let produced_words = word_set(&produced);

    let common = expected_words.intersection(&produced_words).count();
    Ok(common as f64 / expected_words.len() as f64)
}
