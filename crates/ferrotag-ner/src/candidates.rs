//! Systematic chemical-name candidates.
//!
//! Dictionaries cover trivial names ("aspirin") well but cannot enumerate
//! systematic nomenclature ("1,4-dichlorobenzene"). This module proposes
//! IUPAC-looking names from raw text; they only become spans once a
//! [`crate::resolver::StructureResolver`] confirms them.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use ferrotag_common::strip_diacritics;

use crate::config::CandidateConfig;

/// Name → sorted, deduplicated `(start, end)` character offsets.
pub type Candidates = BTreeMap<String, Vec<(usize, usize)>>;

/// Source of candidate names that need external confirmation.
pub trait CandidateGenerator: Send + Sync {
    fn candidates(&self, text: &str) -> Candidates;
}

const ORGANIC_SUFFIXES: &[&str] = &[
    "ane", "ene", "yne", "ol", "al", "one", r"oic\s*acid",
    "ide", "ester", "amide",
    "acid", "aldehyde", "ketone", "nitrile", "isocyanate",
];

const CHEMICAL_PREFIXES: &[&str] = &[
    "di", "tri", "tetra", "penta", "hexa", "hepta", "octa", "nona", "deca",
    "iso", "neo", "cyclo", "ortho", "meta", "para",
    "methyl", "ethyl", "propyl", "butyl", "pentyl", "hexyl",
    "hydroxy", "chloro", "fluoro", "bromo", "iodo", "amino",
    "nitro", "sulfono", "phosphono", "isocyanato", "diisocyanato",
];

const ROOT_FRAGMENTS: &[&str] = &[
    "meth", "eth", "prop", "but", "pent", "hex", "hept", "oct", "non", "dec",
    "undec", "dodec", "tridec", "tetradec",
    "cyclo", "benz", "tolu", "phenyl", "acetyl", "carb", "alkyl",
    "isocyanato", "diisocyanato",
];

const NON_CHEMICAL_ENDINGS: &[&str] = &[
    "al", "ial", "ual", "onal", "ical", "itive",
    "ive", "ible", "able", "ment", "guide", "zone",
    "sis", "ous", "ity", "age", "ure", "equal",
];

const CHEMICAL_INDICATORS: &[&str] = &[
    "cyclo", "di", "tri", "tetra",
    "hydroxy", "chloro", "fluoro",
    "amino", "nitro", "isocyanato",
];

fn alternation(words: &[&str]) -> String {
    words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|")
}

/// Suffixes stay regex fragments (`oic\s*acid` spans whitespace).
fn suffix_alternation() -> String {
    ORGANIC_SUFFIXES.join("|")
}

/// Anchored name pattern, matched at every word start.
fn name_pattern() -> &'static Regex {
    static NAME_PATTERN: OnceLock<Regex> = OnceLock::new();
    NAME_PATTERN.get_or_init(|| {
        let prefixes = alternation(CHEMICAL_PREFIXES);
        let roots = alternation(ROOT_FRAGMENTS);
        let pattern = format!(
            concat!(
                r"(?i)^",
                r"(?:(?:\d+(?:,\d+)*-)+)?", // locants: "1,4-", "2-"
                r"(?:{prefixes})?",
                r"(?:{roots})?",
                r"[A-Za-z]+",
                r"(?:-?\d+)?",
                r"(?:-?(?:{prefixes}))*",
                r"(?:{suffixes})",
                r"\b",
            ),
            prefixes = prefixes,
            roots = roots,
            suffixes = suffix_alternation(),
        );
        Regex::new(&pattern).expect("candidate name pattern is valid")
    })
}

fn suffix_pattern() -> &'static Regex {
    static SUFFIX_PATTERN: OnceLock<Regex> = OnceLock::new();
    SUFFIX_PATTERN.get_or_init(|| {
        Regex::new(&format!(r"(?:{})\b", suffix_alternation())).expect("suffix pattern is valid")
    })
}

fn locant_list_pattern() -> &'static Regex {
    static LOCANT_LIST: OnceLock<Regex> = OnceLock::new();
    LOCANT_LIST.get_or_init(|| Regex::new(r"^\d+(?:,\d+)+$").expect("locant pattern is valid"))
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Regex-and-heuristics extractor for IUPAC-style names.
#[derive(Debug, Clone, Default)]
pub struct IupacNameExtractor {
    config: CandidateConfig,
}

impl IupacNameExtractor {
    pub fn new(config: CandidateConfig) -> Self {
        Self { config }
    }

    /// Heuristic filter for a single matched name.
    pub fn is_valid_name(&self, name: &str) -> bool {
        let len = name.chars().count();
        if len < self.config.min_len || len > self.config.max_len {
            return false;
        }

        let folded = strip_diacritics(name);
        if NON_CHEMICAL_ENDINGS.iter().any(|e| folded.ends_with(e)) {
            return false;
        }

        // A comma before the first hyphen must be a locant list ("1,4")
        let first_part = name.split('-').next().unwrap_or(name);
        if first_part.contains(',') && !locant_list_pattern().is_match(first_part) {
            return false;
        }

        let has_root = ROOT_FRAGMENTS
            .iter()
            .chain(CHEMICAL_PREFIXES)
            .any(|r| folded.contains(r));
        let has_suffix = suffix_pattern().is_match(&folded);
        let has_indicator = CHEMICAL_INDICATORS.iter().any(|i| folded.contains(i));

        let alpha = name.chars().filter(|c| c.is_alphabetic()).count();
        let alpha_ratio = alpha as f64 / len as f64;

        (has_root || has_suffix || has_indicator) && alpha_ratio > self.config.min_alpha_ratio
    }
}

impl CandidateGenerator for IupacNameExtractor {
    /// Every valid name starting at a word start, overlapping names included.
    fn candidates(&self, text: &str) -> Candidates {
        let pattern = name_pattern();
        let mut found = Candidates::new();
        let mut prev: Option<char> = None;

        for (char_idx, (byte_idx, c)) in text.char_indices().enumerate() {
            let at_word_start = !prev.is_some_and(is_word_char);
            prev = Some(c);
            if !at_word_start {
                continue;
            }

            let Some(m) = pattern.find(&text[byte_idx..]) else {
                continue;
            };
            let name = m.as_str();
            if !self.is_valid_name(name) {
                continue;
            }

            let end = char_idx + name.chars().count();
            found.entry(name.to_string()).or_default().push((char_idx, end));
        }

        for offsets in found.values_mut() {
            offsets.sort_unstable();
            offsets.dedup();
        }

        debug!("{} candidate chemical names", found.len());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Candidates {
        IupacNameExtractor::default().candidates(text)
    }

    #[test]
    fn test_locant_prefixed_name_and_its_suffixes() {
        let found = extract("1,4-dichlorobenzene");
        assert_eq!(found.get("1,4-dichlorobenzene"), Some(&vec![(0, 19)]));
        assert_eq!(found.get("4-dichlorobenzene"), Some(&vec![(2, 19)]));
        assert_eq!(found.get("dichlorobenzene"), Some(&vec![(4, 19)]));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_plain_sentence_yields_solvent_only() {
        let found = extract("Samples were washed with ethanol and dried.");
        let expected: Candidates = [("ethanol".to_string(), vec![(25, 32)])].into_iter().collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_non_chemical_ending_is_rejected() {
        assert!(extract("The patient was normal.").is_empty());
        assert!(extract("An optional step.").is_empty());
    }

    #[test]
    fn test_repeated_name_collects_all_offsets() {
        let found = extract("methane and methane");
        assert_eq!(found.get("methane"), Some(&vec![(0, 7), (12, 19)]));
    }

    #[test]
    fn test_names_inside_words_are_not_started() {
        let found = extract("xethanol");
        assert!(!found.contains_key("ethanol"));
    }

    #[test]
    fn test_acid_names_across_whitespace() {
        let found = extract("benzoic acid was added");
        assert_eq!(found.get("benzoic acid"), Some(&vec![(0, 12)]));
    }

    #[test]
    fn test_offsets_are_characters() {
        let found = extract("\u{3b1} methanol");
        assert_eq!(found.get("methanol"), Some(&vec![(2, 10)]));
    }

    #[test]
    fn test_is_valid_name_limits() {
        let extractor = IupacNameExtractor::default();
        assert!(extractor.is_valid_name("ethanol"));
        assert!(!extractor.is_valid_name("ene"));
        assert!(!extractor.is_valid_name(&format!("{}ane", "meth".repeat(13))));
        assert!(!extractor.is_valid_name("1,x-dichloroethane"));
        assert!(extractor.is_valid_name("1,2-dichloroethane"));
        assert!(!extractor.is_valid_name("1,2,3,4-ene"));
    }

    #[test]
    fn test_custom_limits() {
        let extractor = IupacNameExtractor::new(CandidateConfig {
            min_len: 8,
            ..CandidateConfig::default()
        });
        assert!(!extractor.is_valid_name("ethanol"));
        assert!(extractor.is_valid_name("methanol"));
    }
}
