//! Text handling: reader output cleanup and accuracy scoring.

pub mod cleanup;
pub mod scoring;

pub use cleanup::{cleanup_text, normalize_lines, split_lines};
pub use scoring::{success_rate, success_rate_for, word_set};
