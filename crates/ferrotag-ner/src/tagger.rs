//! Tagger facades.
//!
//! [`Tagger`] is the dictionary-only path: compiled automaton plus boundary
//! rules. [`ChemicalTagger`] adds systematic chemical names, confirmed by a
//! structure resolver and merged with the dictionary hits.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use ferrotag_common::{Entity, EntityKind, Span};

use crate::automaton::{Automaton, AutomatonStats};
use crate::candidates::{CandidateGenerator, IupacNameExtractor};
use crate::config::{ResolverConfig, TaggerConfig};
use crate::dictionary::Dictionary;
use crate::error::{ConstructionError, LoadError, Result};
use crate::merge::merge;
use crate::resolver::{resolve_batch, OpsinResolver, StructureResolver};
use crate::scanner::{self, ScanMode};

/// Anything that turns a text into spans.
pub trait SpanExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<Span>;
}

/// Run every extractor over `text` and reconcile their spans.
///
/// Extractor order is the tie-break order for spans with identical offsets.
pub fn extract_and_merge(text: &str, extractors: &[&dyn SpanExtractor]) -> Vec<Span> {
    merge(extractors.iter().map(|extractor| extractor.extract(text)))
}

/// Dictionary tagger over a compiled automaton.
///
/// Immutable after construction; share it as `Arc<Tagger>`.
#[derive(Debug)]
pub struct Tagger {
    automaton: Automaton,
    mode: ScanMode,
    parallel_threshold: usize,
}

impl Tagger {
    pub fn new(dictionary: Dictionary) -> std::result::Result<Self, ConstructionError> {
        Ok(Self {
            automaton: Automaton::build(dictionary)?,
            mode: ScanMode::default(),
            parallel_threshold: 10,
        })
    }

    /// Load a JSON or TSV dictionary and compile it.
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, LoadError> {
        let dictionary = Dictionary::load(path)?;
        Ok(Self::new(dictionary)?)
    }

    pub fn from_config(config: &TaggerConfig) -> Result<Self> {
        let tagger = Self::load(&config.dictionary.path)?
            .with_mode(config.scan.mode)
            .with_parallel_threshold(config.scan.parallel_threshold);
        Ok(tagger)
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    /// Batches larger than `threshold` go through rayon; 0 disables that.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn stats(&self) -> &AutomatonStats {
        self.automaton.stats()
    }

    /// Exact lookup of a whole term.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.automaton.get(name)
    }

    /// Boundary-valid dictionary spans in `text`.
    pub fn extract_entities(&self, text: &str) -> Vec<Span> {
        scanner::extract_with_mode(&self.automaton, text, self.mode)
    }

    /// Extract entities from multiple texts, one result per text, in order.
    pub fn extract_batch(&self, texts: &[&str]) -> Vec<Vec<Span>> {
        debug!("Tagging batch of {} texts", texts.len());

        #[cfg(feature = "parallel")]
        {
            if self.parallel_threshold > 0 && texts.len() > self.parallel_threshold {
                use rayon::prelude::*;
                return texts
                    .par_iter()
                    .map(|text| self.extract_entities(text))
                    .collect();
            }
        }

        texts.iter().map(|text| self.extract_entities(text)).collect()
    }
}

impl SpanExtractor for Tagger {
    fn extract(&self, text: &str) -> Vec<Span> {
        self.extract_entities(text)
    }
}

/// Dictionary tagging plus resolver-confirmed systematic names.
pub struct ChemicalTagger {
    tagger: Arc<Tagger>,
    generator: Box<dyn CandidateGenerator>,
    resolver: Arc<dyn StructureResolver>,
    resolver_config: ResolverConfig,
}

impl ChemicalTagger {
    pub fn new(tagger: Arc<Tagger>, resolver: Arc<dyn StructureResolver>) -> Self {
        Self {
            tagger,
            generator: Box::new(IupacNameExtractor::default()),
            resolver,
            resolver_config: ResolverConfig::default(),
        }
    }

    /// Dictionary tagger, candidate limits and an HTTP resolver, all from config.
    pub fn from_config(config: &TaggerConfig) -> Result<Self> {
        let tagger = Arc::new(Tagger::from_config(config)?);
        let resolver = Arc::new(OpsinResolver::from_config(&config.resolver)?);
        Ok(Self::new(tagger, resolver)
            .with_generator(IupacNameExtractor::new(config.candidates.clone()))
            .with_resolver_config(config.resolver.clone()))
    }

    pub fn with_generator(mut self, generator: impl CandidateGenerator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver_config = config;
        self
    }

    pub fn tagger(&self) -> &Arc<Tagger> {
        &self.tagger
    }

    /// Candidate names the resolver knows, one span per occurrence.
    pub async fn resolved_candidates(&self, text: &str) -> Vec<Span> {
        let candidates = self.generator.candidates(text);
        if candidates.is_empty() {
            return Vec::new();
        }

        let structures = resolve_batch(
            Arc::clone(&self.resolver),
            candidates.keys().cloned(),
            &self.resolver_config,
        )
        .await;

        let mut spans: Vec<Span> = candidates
            .iter()
            .filter_map(|(name, offsets)| structures.get(name).map(|smiles| (name, offsets, smiles)))
            .flat_map(|(name, offsets, smiles)| {
                offsets.iter().map(move |&(start, end)| {
                    let entity = Entity::new(name.as_str(), EntityKind::Chemical, smiles.as_str());
                    Span::new(start, end, name.as_str(), entity)
                })
            })
            .collect();

        spans.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| b.len().cmp(&a.len()))
                .then_with(|| a.term.cmp(&b.term))
        });
        debug!("{} of {} candidate names resolved", structures.len(), candidates.len());
        spans
    }

    /// Dictionary spans and resolved candidates, reconciled.
    ///
    /// With identical offsets, the dictionary span is listed first.
    pub async fn extract_chem_entities(&self, text: &str) -> Vec<Span> {
        let dictionary_spans = self.tagger.extract_entities(text);
        let candidate_spans = self.resolved_candidates(text).await;
        merge([dictionary_spans, candidate_spans])
    }
}
