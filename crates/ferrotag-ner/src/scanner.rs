//! Boundary-aware extraction on top of the raw automaton scan.
//!
//! Dictionary terms routinely occur inside markup and chemical notation
//! (SMILES fragments, tags, bracketed locants). A raw hit is only reported
//! when both of its edges sit on a token boundary.

use serde::{Deserialize, Serialize};

use ferrotag_common::{normalize_chars, Span};

use crate::automaton::{Automaton, RawMatch};

/// Characters that delimit a standalone token.
pub const STOP_CHARS: [char; 10] = [' ', ',', '.', '\n', '\t', '<', '>', '(', ')', '/'];

/// How raw automaton hits are selected before boundary filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Every boundary-valid hit, nested and overlapping ones included.
    #[default]
    Overlapping,
    /// Reduce hits to the leftmost-longest non-overlapping set first.
    LeftmostLongest,
}

#[inline]
fn is_stop_char(c: char) -> bool {
    STOP_CHARS.contains(&c)
}

/// Boundary rule for a match covering `chars[start..=end]`.
///
/// Right edge: end of text, a stop char, or `:`; a trailing `>` or `(` only
/// counts when the match starts the text. Left edge: start of text or a stop
/// char; a leading `<` or `)` only counts when the match ends the text.
pub fn accepts(chars: &[char], start: usize, end: usize) -> bool {
    let next = chars.get(end + 1).copied();
    let prev = start.checked_sub(1).and_then(|i| chars.get(i).copied());

    let right_ok = match next {
        None => true,
        Some('>' | '(') => start == 0,
        Some(c) => is_stop_char(c) || c == ':',
    };
    let left_ok = match prev {
        None => true,
        Some('<' | ')') => end + 1 == chars.len(),
        Some(c) => is_stop_char(c),
    };

    right_ok && left_ok
}

/// Extract boundary-valid dictionary spans, every hit reported.
pub fn extract(automaton: &Automaton, text: &str) -> Vec<Span> {
    extract_with_mode(automaton, text, ScanMode::Overlapping)
}

/// Extract boundary-valid dictionary spans, ordered by start then longest first.
///
/// Offsets are character offsets into `text`; normalization never changes
/// the character count, so they index the original text as well.
pub fn extract_with_mode(automaton: &Automaton, text: &str, mode: ScanMode) -> Vec<Span> {
    let chars = normalize_chars(text);
    if chars.is_empty() {
        return Vec::new();
    }

    let raw = automaton.scan_chars(chars.iter().copied());
    let hits: Vec<RawMatch<'_>> = match mode {
        ScanMode::Overlapping => raw.collect(),
        ScanMode::LeftmostLongest => leftmost_longest(raw.collect()),
    };

    let mut spans: Vec<Span> = hits
        .into_iter()
        .filter(|m| accepts(&chars, m.start(), m.end))
        .map(|m| Span::new(m.start(), m.end + 1, m.term, m.entity.clone()))
        .collect();

    spans.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.len().cmp(&a.len())));
    spans
}

fn leftmost_longest(mut hits: Vec<RawMatch<'_>>) -> Vec<RawMatch<'_>> {
    if hits.is_empty() {
        return hits;
    }

    // Sort by start position, then by length (longest first)
    hits.sort_by(|a, b| {
        a.start()
            .cmp(&b.start())
            .then_with(|| b.term_len.cmp(&a.term_len))
    });

    let mut result = Vec::with_capacity(hits.len());
    let mut next_free = 0;
    for hit in hits {
        if hit.start() >= next_free {
            next_free = hit.end + 1;
            result.push(hit);
        }
    }
    result
}
