use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The dictionary cannot be compiled into an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("dictionary is empty")]
    EmptyDictionary,

    #[error("term for entity {entity_id} is empty after normalization")]
    EmptyTerm { entity_id: String },
}

/// A serialized dictionary could not be turned into a usable automaton.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dictionary not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read dictionary {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read dictionary stream: {0}")]
    Read(#[source] std::io::Error),

    #[error("malformed dictionary JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed dictionary line {line}: {reason}")]
    Invalid { line: usize, reason: String },

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// A single structure-resolution attempt failed.
///
/// Never crosses [`crate::resolver::resolve_batch`]; the affected name is
/// treated as unresolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resolver request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("resolver returned HTTP {0}")]
    Status(u16),

    #[error("resolution timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid resolver URL: {0}")]
    InvalidUrl(String),

    #[error("name cannot be resolved: {0:?}")]
    InvalidName(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

pub type Result<T> = std::result::Result<T, TaggerError>;
