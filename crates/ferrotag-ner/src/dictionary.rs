//! Term → entity dictionaries and their serialized forms.
//!
//! Two on-disk layouts are accepted:
//! - JSON: `{ "entries": [ { "term", "name", "kind", "id" }, ... ] }`
//! - TSV (`.tsv` extension): `term<TAB>name<TAB>kind<TAB>id`, `#` comments,
//!   optional `term` header row.
//!
//! Building a dictionary from ontologies or flat-file databases happens
//! offline; this module only reads the assembled result.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ferrotag_common::{normalize_term, Entity, EntityKind};

use crate::error::LoadError;

/// One serialized dictionary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Surface form; normalized on insertion.
    pub term: String,
    /// Canonical entity name.
    pub name: String,
    pub kind: EntityKind,
    /// Stable external identifier.
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct DictionaryFile {
    entries: Vec<DictionaryEntry>,
}

/// Mapping from normalized term to a single entity.
///
/// Inserting a term twice replaces the entity but keeps the term's first
/// insertion position, so iteration order (and therefore automaton layout) is
/// deterministic for a given input.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    index: AHashMap<String, usize>,
    entries: Vec<(String, Entity)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `term`, returning the entity it previously mapped to.
    pub fn insert(&mut self, term: &str, entity: Entity) -> Option<Entity> {
        let term = normalize_term(term);
        match self.index.get(&term) {
            Some(&idx) => Some(std::mem::replace(&mut self.entries[idx].1, entity)),
            None => {
                self.index.insert(term.clone(), self.entries.len());
                self.entries.push((term, entity));
                None
            }
        }
    }

    /// Exact lookup of a name after normalization.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.index
            .get(&normalize_term(name))
            .map(|&idx| &self.entries[idx].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.entries.iter().map(|(term, entity)| (term.as_str(), entity))
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Entity)> {
        self.entries
    }

    /// Load a dictionary file, choosing the layout by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let is_tsv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
        let dictionary = if is_tsv {
            Self::from_tsv_reader(reader)?
        } else {
            Self::from_reader(reader)?
        };

        info!("Loaded {} terms from {}", dictionary.len(), path.display());
        Ok(dictionary)
    }

    /// Read the JSON layout.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let file: DictionaryFile = serde_json::from_reader(reader)?;
        Ok(file.entries.into_iter().collect())
    }

    /// Read the TSV layout.
    pub fn from_tsv_reader<R: BufRead>(reader: R) -> Result<Self, LoadError> {
        let mut dictionary = Self::new();
        let mut replaced = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(LoadError::Read)?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let cols: Vec<&str> = line.split('\t').collect();
            let [term, name, kind, id] = cols.as_slice() else {
                return Err(LoadError::Invalid {
                    line: line_no,
                    reason: format!("expected 4 tab-separated columns, found {}", cols.len()),
                });
            };

            // Header row
            if dictionary.is_empty() && term.eq_ignore_ascii_case("term") {
                continue;
            }
            if term.trim().is_empty() {
                return Err(LoadError::Invalid {
                    line: line_no,
                    reason: "empty term".to_string(),
                });
            }

            let entity = Entity::new(*name, EntityKind::from_label(kind), *id);
            if dictionary.insert(term, entity).is_some() {
                replaced += 1;
            }
        }

        if replaced > 0 {
            debug!("{} duplicate terms replaced by later rows", replaced);
        }
        Ok(dictionary)
    }
}

impl FromIterator<DictionaryEntry> for Dictionary {
    fn from_iter<T: IntoIterator<Item = DictionaryEntry>>(iter: T) -> Self {
        let mut dictionary = Self::new();
        for entry in iter {
            dictionary.insert(&entry.term, Entity::new(entry.name, entry.kind, entry.id));
        }
        dictionary
    }
}

impl<'a> FromIterator<(&'a str, Entity)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (&'a str, Entity)>>(iter: T) -> Self {
        let mut dictionary = Self::new();
        for (term, entity) in iter {
            dictionary.insert(term, entity);
        }
        dictionary
    }
}
