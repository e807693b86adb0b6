//! Configuration loading for ferrotag.
//! Reads ferrotag.toml from the current directory or the path in FERROTAG_CONFIG.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::scanner::ScanMode;

pub const CONFIG_ENV: &str = "FERROTAG_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "ferrotag.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaggerConfig {
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub candidates: CandidateConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// JSON or TSV (by extension) dictionary file.
    #[serde(default = "default_dictionary_path")]
    pub path: PathBuf,
}

fn default_dictionary_path() -> PathBuf { PathBuf::from("data/dictionary.json") }

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self { path: default_dictionary_path() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub mode: ScanMode,
    /// Batches larger than this are processed in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_parallel_threshold() -> usize { 10 }

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::default(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

/// Heuristic limits applied to candidate chemical names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateConfig {
    #[serde(default = "default_min_len")]
    pub min_len: usize,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    /// Alphabetic characters must make up strictly more than this share.
    #[serde(default = "default_min_alpha_ratio")]
    pub min_alpha_ratio: f64,
}

fn default_min_len()         -> usize { 4 }
fn default_max_len()         -> usize { 50 }
fn default_min_alpha_ratio() -> f64 { 0.6 }

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            min_len: default_min_len(),
            max_len: default_max_len(),
            min_alpha_ratio: default_min_alpha_ratio(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum resolutions in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-name timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url()    -> String { "https://opsin.ch.cam.ac.uk/opsin".to_string() }
fn default_concurrency() -> usize { 8 }
fn default_timeout_ms()  -> u64 { 10_000 }

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            concurrency: default_concurrency(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl TaggerConfig {
    /// Load configuration from ferrotag.toml.
    /// Checks FERROTAG_CONFIG env var first, then current directory.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: TaggerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let candidates = &self.candidates;
        if candidates.min_len > candidates.max_len {
            return Err(ConfigError::Invalid(format!(
                "candidates.min_len ({}) exceeds candidates.max_len ({})",
                candidates.min_len, candidates.max_len
            )));
        }
        if !(0.0..=1.0).contains(&candidates.min_alpha_ratio) {
            return Err(ConfigError::Invalid(format!(
                "candidates.min_alpha_ratio must be within [0, 1], got {}",
                candidates.min_alpha_ratio
            )));
        }

        let resolver = &self.resolver;
        if resolver.concurrency == 0 {
            return Err(ConfigError::Invalid("resolver.concurrency must be at least 1".to_string()));
        }
        if resolver.timeout_ms == 0 {
            return Err(ConfigError::Invalid("resolver.timeout_ms must be positive".to_string()));
        }
        if let Err(e) = reqwest::Url::parse(&resolver.base_url) {
            return Err(ConfigError::Invalid(format!(
                "resolver.base_url {:?} is not a URL: {}",
                resolver.base_url, e
            )));
        }

        Ok(())
    }
}
