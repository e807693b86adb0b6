//! Dictionary-based biomedical entity tagging.
//!
//! Finds known chemical, disease and protein names in free text with a
//! single Aho-Corasick pass, keeps only boundary-correct hits, and merges them
//! with resolver-confirmed systematic chemical names.
//!
//! ```rust,no_run
//! use ferrotag_ner::Tagger;
//!
//! fn main() -> ferrotag_ner::Result<()> {
//!     let tagger = Tagger::load("data/dictionary.json")?;
//!     for span in tagger.extract_entities("patient took aspirin and insulin.") {
//!         println!("{}..{} {} -> {}", span.start, span.end, span.term, span.entity.entity_id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod automaton;
pub mod candidates;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod merge;
pub mod resolver;
pub mod scanner;
pub mod tagger;

pub use automaton::{Automaton, AutomatonStats, RawMatch};
pub use candidates::{CandidateGenerator, Candidates, IupacNameExtractor};
pub use config::TaggerConfig;
pub use dictionary::{Dictionary, DictionaryEntry};
pub use error::{ConfigError, ConstructionError, LoadError, ResolveError, Result, TaggerError};
pub use merge::merge;
pub use resolver::{resolve_batch, OpsinResolver, StaticResolver, StructureResolver};
pub use scanner::{extract, extract_with_mode, ScanMode};
pub use tagger::{extract_and_merge, ChemicalTagger, SpanExtractor, Tagger};

pub use ferrotag_common::{Entity, EntityKind, Span};
