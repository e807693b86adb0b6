//! Laws that must hold for arbitrary dictionaries, texts and span sets.
//!
//! The hand-built automaton is checked against the `aho-corasick` crate on
//! ASCII input, where byte and character offsets coincide.

use std::collections::{BTreeSet, HashSet};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use proptest::prelude::*;

use ferrotag_common::normalize_term;
use ferrotag_ner::scanner::accepts;
use ferrotag_ner::{
    extract_with_mode, merge, Automaton, Dictionary, Entity, EntityKind, ScanMode, Span, Tagger,
};

fn dictionary(terms: &BTreeSet<String>) -> Dictionary {
    terms
        .iter()
        .map(|t| (t.as_str(), Entity::new(t.as_str(), EntityKind::Chemical, format!("ID:{t}"))))
        .collect()
}

fn terms_strategy() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[abc]{1,4}", 1..8)
}

fn text_strategy() -> impl Strategy<Value = String> {
    "[abc ,.()<>:/]{0,40}"
}

fn span_strategy() -> impl Strategy<Value = Span> {
    (0usize..30, 1usize..10, 0u8..3).prop_map(|(start, len, payload)| {
        let id = format!("P{payload}");
        let entity = Entity::new(id.as_str(), EntityKind::Other, id.as_str());
        Span::new(start, start + len, id.to_lowercase(), entity)
    })
}

fn sources_strategy() -> impl Strategy<Value = Vec<Vec<Span>>> {
    prop::collection::vec(prop::collection::vec(span_strategy(), 0..8), 0..4)
}

proptest! {
    #[test]
    fn raw_matches_agree_with_aho_corasick(terms in terms_strategy(), text in text_strategy()) {
        let automaton = Automaton::build(dictionary(&terms)).unwrap();
        let patterns: Vec<&str> = terms.iter().map(String::as_str).collect();
        let oracle = AhoCorasick::new(&patterns).unwrap();

        let mut ours: Vec<(usize, usize, String)> = automaton
            .scan(&text)
            .map(|m| (m.start(), m.end + 1, m.term.to_string()))
            .collect();
        let mut theirs: Vec<(usize, usize, String)> = oracle
            .find_overlapping_iter(&text)
            .map(|m| (m.start(), m.end(), patterns[m.pattern().as_usize()].to_string()))
            .collect();

        ours.sort();
        theirs.sort();
        prop_assert_eq!(ours, theirs);
    }

    #[test]
    fn leftmost_longest_agrees_with_aho_corasick(terms in terms_strategy(), text in text_strategy()) {
        let automaton = Automaton::build(dictionary(&terms)).unwrap();
        let patterns: Vec<&str> = terms.iter().map(String::as_str).collect();
        let oracle = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .unwrap();

        let chars: Vec<char> = text.chars().collect();
        let expected: Vec<(usize, usize)> = oracle
            .find_iter(&text)
            .filter(|m| accepts(&chars, m.start(), m.end() - 1))
            .map(|m| (m.start(), m.end()))
            .collect();
        let actual: Vec<(usize, usize)> = extract_with_mode(&automaton, &text, ScanMode::LeftmostLongest)
            .iter()
            .map(|s| (s.start, s.end))
            .collect();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn spans_cover_their_dictionary_term(terms in terms_strategy(), text in text_strategy()) {
        let dict = dictionary(&terms);
        let tagger = Tagger::new(dict.clone()).unwrap();
        let chars: Vec<char> = text.chars().collect();

        for span in tagger.extract_entities(&text) {
            prop_assert!(span.start < span.end && span.end <= chars.len());
            prop_assert_eq!(normalize_term(&span.slice(&text)), span.term.clone());
            prop_assert!(dict.get(&span.term).is_some());
            prop_assert!(accepts(&chars, span.start, span.end - 1));
        }
    }

    #[test]
    fn extraction_is_idempotent(terms in terms_strategy(), text in text_strategy()) {
        let tagger = Tagger::new(dictionary(&terms)).unwrap();
        prop_assert_eq!(tagger.extract_entities(&text), tagger.extract_entities(&text));
    }

    #[test]
    fn longest_match_first_at_each_start(terms in terms_strategy(), text in text_strategy()) {
        let tagger = Tagger::new(dictionary(&terms)).unwrap();
        let spans = tagger.extract_entities(&text);
        for pair in spans.windows(2) {
            prop_assert!(pair[0].start < pair[1].start || pair[0].len() > pair[1].len());
        }
    }

    #[test]
    fn merged_spans_never_strictly_contain_each_other(sources in sources_strategy()) {
        let merged = merge(sources);
        for a in &merged {
            for b in &merged {
                prop_assert!(!a.strictly_contains(b), "{:?} contains {:?}", a, b);
            }
        }
        prop_assert!(merged.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn every_input_span_is_kept_or_covered(sources in sources_strategy()) {
        let merged = merge(sources.clone());
        for span in sources.iter().flatten() {
            prop_assert!(merged.iter().any(|m| m == span || m.strictly_contains(span)));
        }
    }

    #[test]
    fn identical_extents_with_different_payloads_survive(start in 0usize..20, len in 1usize..10) {
        let a = Span::new(start, start + len, "a", Entity::new("A", EntityKind::Chemical, "A"));
        let b = Span::new(start, start + len, "b", Entity::new("B", EntityKind::Disease, "B"));
        prop_assert_eq!(merge(vec![vec![a.clone()], vec![b.clone()]]), vec![a, b]);
    }

    #[test]
    fn merging_in_stages_keeps_the_same_spans(sources in sources_strategy()) {
        let flat: HashSet<Span> = merge(sources.clone()).into_iter().collect();
        let staged: HashSet<Span> = sources
            .into_iter()
            .fold(Vec::new(), |acc, source| merge(vec![acc, source]))
            .into_iter()
            .collect();
        prop_assert_eq!(flat, staged);
    }
}
