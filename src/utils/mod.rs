//! Utility functions and helpers.

pub mod http;

use unicode_segmentation::UnicodeSegmentation;

/// Normalize a string for identity comparison: trim, collapse internal
/// whitespace, and case-fold.
///
/// Feed sources are inconsistent about casing and spacing, so identity
/// is always computed over the normalized form.
pub fn normalize_identity(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Truncate a string to at most `max` grapheme clusters.
///
/// Byte-index truncation can split a multi-byte character; grapheme
/// truncation keeps the prefix well-formed.
pub fn truncate_graphemes(s: &str, max: usize) -> String {
    s.graphemes(true).take(max).collect()
}
