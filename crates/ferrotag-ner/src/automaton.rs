//! Aho-Corasick automaton over dictionary terms.
//!
//! Finds every dictionary term occurring in a text in one pass:
//! - trie with one edge per (normalized) `char`
//! - failure links computed breadth-first
//! - each node's output set already includes everything reachable through
//!   its failure chain, so a scan never walks output links
//!
//! Nodes live in a single arena, node 0 is the root. The automaton is never
//! mutated after [`Automaton::build`], so it can be shared across threads
//! without locking.

use std::collections::VecDeque;

use ahash::AHashMap;
use tracing::info;

use ferrotag_common::{normalize_char, normalize_term, Entity, EntityKind};

use crate::dictionary::Dictionary;
use crate::error::ConstructionError;

const ROOT: u32 = 0;

#[derive(Debug, Default)]
struct Node {
    children: AHashMap<char, u32>,
    fail: u32,
    /// Term ending exactly at this node.
    terminal: Option<u32>,
    /// Effective output: own term first, then failure-chain terms, longest first.
    outputs: Vec<u32>,
}

#[derive(Debug)]
struct TermInfo {
    term: String,
    len: usize,
    entity: Entity,
}

/// Counts reported after a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomatonStats {
    pub term_count: usize,
    pub node_count: usize,
    pub chemical_count: usize,
    pub disease_count: usize,
    pub protein_count: usize,
    pub other_count: usize,
}

/// One dictionary hit reported by [`Automaton::scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMatch<'a> {
    /// Index of the last matched character (inclusive).
    pub end: usize,
    pub term: &'a str,
    /// Term length in characters.
    pub term_len: usize,
    pub entity: &'a Entity,
}

impl RawMatch<'_> {
    /// Index of the first matched character.
    pub fn start(&self) -> usize {
        self.end + 1 - self.term_len
    }
}

/// Compiled multi-pattern matcher built once from a [`Dictionary`].
#[derive(Debug)]
pub struct Automaton {
    nodes: Vec<Node>,
    terms: Vec<TermInfo>,
    stats: AutomatonStats,
}

impl Automaton {
    /// Compile a dictionary.
    ///
    /// Time and space are linear in the total length of all terms.
    pub fn build(dictionary: Dictionary) -> Result<Self, ConstructionError> {
        if dictionary.is_empty() {
            return Err(ConstructionError::EmptyDictionary);
        }

        let mut nodes = vec![Node::default()];
        let mut terms = Vec::with_capacity(dictionary.len());

        // Goto function
        for (term, entity) in dictionary.into_entries() {
            if term.is_empty() {
                return Err(ConstructionError::EmptyTerm {
                    entity_id: entity.entity_id,
                });
            }

            let mut state = ROOT;
            for c in term.chars() {
                state = match nodes[state as usize].children.get(&c) {
                    Some(&next) => next,
                    None => {
                        let next = nodes.len() as u32;
                        nodes.push(Node::default());
                        nodes[state as usize].children.insert(c, next);
                        next
                    }
                };
            }

            let id = terms.len() as u32;
            let node = &mut nodes[state as usize];
            node.terminal = Some(id);
            node.outputs.push(id);
            terms.push(TermInfo {
                len: term.chars().count(),
                term,
                entity,
            });
        }

        // Failure function, breadth-first. A node's failure target is always
        // shallower, so its output set is final by the time it is copied.
        let mut queue: VecDeque<u32> = nodes[ROOT as usize].children.values().copied().collect();
        while let Some(state) = queue.pop_front() {
            let transitions: Vec<(char, u32)> = nodes[state as usize]
                .children
                .iter()
                .map(|(&c, &child)| (c, child))
                .collect();

            for (c, child) in transitions {
                let mut fallback = nodes[state as usize].fail;
                let fail = loop {
                    if let Some(&next) = nodes[fallback as usize].children.get(&c) {
                        break next;
                    }
                    if fallback == ROOT {
                        break ROOT;
                    }
                    fallback = nodes[fallback as usize].fail;
                };

                nodes[child as usize].fail = fail;
                let inherited = nodes[fail as usize].outputs.clone();
                nodes[child as usize].outputs.extend(inherited);
                queue.push_back(child);
            }
        }

        let stats = Self::compute_stats(&nodes, &terms);
        info!(
            "Automaton built: {} terms, {} nodes ({} chemicals, {} diseases, {} proteins, {} other)",
            stats.term_count,
            stats.node_count,
            stats.chemical_count,
            stats.disease_count,
            stats.protein_count,
            stats.other_count
        );

        Ok(Self { nodes, terms, stats })
    }

    /// Scan `text` (normalized on the fly) for every dictionary term.
    pub fn scan<'a>(&'a self, text: &'a str) -> Scan<'a, impl Iterator<Item = char> + 'a> {
        self.scan_chars(text.chars().map(normalize_char))
    }

    /// Scan an already-normalized character sequence.
    pub fn scan_chars<I>(&self, chars: I) -> Scan<'_, I::IntoIter>
    where
        I: IntoIterator<Item = char>,
    {
        Scan {
            automaton: self,
            chars: chars.into_iter(),
            state: ROOT,
            position: 0,
            pending: &[],
            pending_end: 0,
        }
    }

    /// Exact lookup of a whole term.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        let mut state = ROOT;
        for c in normalize_term(name).chars() {
            state = *self.nodes[state as usize].children.get(&c)?;
        }
        self.nodes[state as usize]
            .terminal
            .map(|id| &self.terms[id as usize].entity)
    }

    pub fn stats(&self) -> &AutomatonStats {
        &self.stats
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    fn step(&self, mut state: u32, c: char) -> u32 {
        loop {
            if let Some(&next) = self.nodes[state as usize].children.get(&c) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state as usize].fail;
        }
    }

    fn compute_stats(nodes: &[Node], terms: &[TermInfo]) -> AutomatonStats {
        let count = |kinds: &[EntityKind]| {
            terms
                .iter()
                .filter(|t| kinds.contains(&t.entity.kind))
                .count()
        };
        let chemical_count = count(&[EntityKind::Chemical, EntityKind::Drug]);
        let disease_count = count(&[EntityKind::Disease]);
        let protein_count = count(&[EntityKind::Protein, EntityKind::Gene]);

        AutomatonStats {
            term_count: terms.len(),
            node_count: nodes.len(),
            chemical_count,
            disease_count,
            protein_count,
            other_count: terms.len() - chemical_count - disease_count - protein_count,
        }
    }
}

/// Lazy, single-pass iterator over the raw matches of one text.
///
/// Not restartable: scanning again means building a new iterator.
pub struct Scan<'a, I> {
    automaton: &'a Automaton,
    chars: I,
    state: u32,
    position: usize,
    pending: &'a [u32],
    pending_end: usize,
}

impl<'a, I> Iterator for Scan<'a, I>
where
    I: Iterator<Item = char>,
{
    type Item = RawMatch<'a>;

    fn next(&mut self) -> Option<RawMatch<'a>> {
        loop {
            if let Some((&id, rest)) = self.pending.split_first() {
                self.pending = rest;
                let info = &self.automaton.terms[id as usize];
                return Some(RawMatch {
                    end: self.pending_end,
                    term: &info.term,
                    term_len: info.len,
                    entity: &info.entity,
                });
            }

            let c = self.chars.next()?;
            self.state = self.automaton.step(self.state, c);
            self.pending = &self.automaton.nodes[self.state as usize].outputs;
            self.pending_end = self.position;
            self.position += 1;
        }
    }
}
