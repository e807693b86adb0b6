//! Text normalization shared by dictionary build time and scan time.
//!
//! Terms and texts must go through the same functions, otherwise terms
//! silently stop matching.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Right single quotation mark, folded to the ASCII apostrophe.
pub const RIGHT_SINGLE_QUOTE: char = '\u{2019}';

/// Normalize a single character.
///
/// Lowercases and folds `’` to `'`. Characters whose lowercase form expands
/// to several chars keep only the first, so a normalized text always has the
/// same character count as its source.
#[inline]
pub fn normalize_char(c: char) -> char {
    if c == RIGHT_SINGLE_QUOTE {
        return '\'';
    }
    c.to_lowercase().next().unwrap_or(c)
}

/// Normalize a text into the character sequence the automaton scans.
pub fn normalize_chars(text: &str) -> Vec<char> {
    text.chars().map(normalize_char).collect()
}

/// Normalize a dictionary term (or a lookup key).
pub fn normalize_term(term: &str) -> String {
    term.chars().map(normalize_char).collect()
}

/// Lowercase and remove diacritics (NFKD, combining marks dropped).
///
/// Only used for heuristic checks on candidate names; it may change length.
pub fn strip_diacritics(name: &str) -> String {
    name.to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}
