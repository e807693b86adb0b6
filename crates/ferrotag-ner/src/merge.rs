//! Reconciling spans produced by independent matchers.
//!
//! The output keeps, for every region of text, the widest span any source
//! proposed. Spans with identical offsets but different payloads are all
//! kept, since the sources disagree on what the region is and neither is
//! more specific than the other.

use ferrotag_common::Span;

/// Merge spans from several sources into one annotation set.
///
/// - a span strictly inside another span is dropped
/// - spans with the same offsets survive side by side, in source order
/// - exact duplicates (same offsets and payload) are reported once
///
/// The result is ordered by start offset. Source order only breaks ties
/// between identical extents.
pub fn merge<I, S>(sources: I) -> Vec<Span>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = Span>,
{
    let mut candidates: Vec<(usize, Span)> = sources
        .into_iter()
        .enumerate()
        .flat_map(|(source, spans)| spans.into_iter().map(move |span| (source, span)))
        .collect();

    // Containers always sort before what they contain
    candidates.sort_by(|(sa, a), (sb, b)| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| sa.cmp(sb))
    });

    let mut accepted: Vec<Span> = Vec::with_capacity(candidates.len());
    for (_, candidate) in candidates {
        let redundant = accepted
            .iter()
            .any(|kept| kept.strictly_contains(&candidate) || *kept == candidate);
        if redundant {
            continue;
        }

        accepted.retain(|kept| !candidate.strictly_contains(kept));
        accepted.push(candidate);
    }

    accepted.sort_by_key(|span| span.start);
    accepted
}
