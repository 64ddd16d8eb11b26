//! Free-text canonicalization for answer comparison.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize text for comparison.
///
/// Lowercases, NFD-decomposes and drops combining diacritics, unifies
/// curly apostrophes, maps hyphens and dashes to spaces, collapses
/// whitespace runs, and trims. Pure and total: empty in, empty out.
/// Idempotent, so already-normalized text passes through unchanged.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '-' | '\u{2013}' | '\u{2014}' => ' ',
            other => other,
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
