//! Entity records that dictionary terms and resolved candidates point at.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of biomedical entity a term refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(alias = "CHEMICAL", alias = "chemical")]
    Chemical,
    #[serde(alias = "DISEASE", alias = "disease")]
    Disease,
    #[serde(alias = "PROTEIN", alias = "protein")]
    Protein,
    #[serde(alias = "GENE", alias = "gene")]
    Gene,
    #[serde(alias = "DRUG", alias = "drug")]
    Drug,
    #[serde(alias = "OTHER", alias = "other")]
    Other,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Chemical => "Chemical",
            EntityKind::Disease => "Disease",
            EntityKind::Protein => "Protein",
            EntityKind::Gene => "Gene",
            EntityKind::Drug => "Drug",
            EntityKind::Other => "Other",
        }
    }

    /// Map a source label (ontology export, tagger column, BIO tag) to a kind.
    ///
    /// Matching is case-insensitive; unknown labels become [`EntityKind::Other`].
    pub fn from_label(label: &str) -> Self {
        let clean = label
            .trim()
            .trim_start_matches("B-")
            .trim_start_matches("I-")
            .to_ascii_lowercase();

        label_map().get(clean.as_str()).copied().unwrap_or(EntityKind::Other)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn label_map() -> &'static HashMap<&'static str, EntityKind> {
    use std::sync::OnceLock;
    static LABEL_MAP: OnceLock<HashMap<&'static str, EntityKind>> = OnceLock::new();
    LABEL_MAP.get_or_init(|| {
        let mut m = HashMap::new();

        m.insert("chemical", EntityKind::Chemical);
        m.insert("simple_chemical", EntityKind::Chemical);
        m.insert("compound", EntityKind::Chemical);
        m.insert("smiles", EntityKind::Chemical);

        m.insert("disease", EntityKind::Disease);
        m.insert("specificdisease", EntityKind::Disease);
        m.insert("diseaseclass", EntityKind::Disease);
        m.insert("phenotype", EntityKind::Disease);

        m.insert("protein", EntityKind::Protein);
        m.insert("uniprot", EntityKind::Protein);

        m.insert("gene", EntityKind::Gene);
        m.insert("ggp", EntityKind::Gene);
        m.insert("gene_or_gene_product", EntityKind::Gene);

        m.insert("drug", EntityKind::Drug);

        m
    })
}

/// Canonical `(name, kind, id)` triple a term resolves to.
///
/// `entity_id` is an external accession (EFO/MONDO id, UniProt accession,
/// ChEMBL id) or, for resolved chemical candidates, the structure string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub canonical_name: String,
    pub kind: EntityKind,
    pub entity_id: String,
}

impl Entity {
    pub fn new(
        canonical_name: impl Into<String>,
        kind: EntityKind,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            kind,
            entity_id: entity_id.into(),
        }
    }
}
