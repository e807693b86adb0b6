//! Name → structure resolution.
//!
//! A resolver turns a candidate chemical name into a structure string
//! (SMILES). The engine only needs [`StructureResolver`]; which service or
//! table answers is up to the caller.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, instrument, warn};

use crate::config::ResolverConfig;
use crate::error::ResolveError;

#[async_trait]
pub trait StructureResolver: Send + Sync {
    /// `Ok(None)` when the resolver understood the request but knows no
    /// structure for `name`.
    async fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError>;
}

/// In-memory name → structure table.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    table: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, structure: impl Into<String>) {
        self.table.insert(name.into(), structure.into());
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StaticResolver
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            table: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[async_trait]
impl StructureResolver for StaticResolver {
    async fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
        Ok(self.table.get(name).cloned())
    }
}

/// Client for an OPSIN-style web service: `GET {base_url}/{name}.smi`
/// answers with the SMILES as plain text, or 404 for unparseable names.
#[derive(Debug, Clone)]
pub struct OpsinResolver {
    client: Client,
    base_url: Url,
}

impl OpsinResolver {
    pub fn new(base_url: &str) -> Result<Self, ResolveError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Client with the configured per-request timeout.
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Self::with_client(client, &config.base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ResolveError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ResolveError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ResolveError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Request URL for `name`, percent-encoded as a single path segment.
    pub fn structure_url(&self, name: &str) -> Result<Url, ResolveError> {
        if name.trim().is_empty() {
            return Err(ResolveError::InvalidName(name.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ResolveError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&format!("{name}.smi"));
        Ok(url)
    }
}

#[async_trait]
impl StructureResolver for OpsinResolver {
    #[instrument(skip(self))]
    async fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
        let url = self.structure_url(name)?;
        debug!(url = %url, "Resolving structure");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let smiles = body.trim();
        Ok((!smiles.is_empty()).then(|| smiles.to_string()))
    }
}

/// Resolve many names with at most `config.concurrency` in flight.
///
/// Every attempt runs in its own task under `config.timeout()`. Errors,
/// timeouts and panics only affect their own name, which is left out of the
/// result. Must be called from within a tokio runtime.
pub async fn resolve_batch<I>(
    resolver: Arc<dyn StructureResolver>,
    names: I,
    config: &ResolverConfig,
) -> HashMap<String, String>
where
    I: IntoIterator<Item = String>,
{
    let timeout = config.timeout();
    let names: BTreeSet<String> = names.into_iter().collect();
    let requested = names.len();

    let resolved: HashMap<String, String> = stream::iter(names)
        .map(|name| {
            let resolver = Arc::clone(&resolver);
            async move {
                let lookup = name.clone();
                let task = tokio::spawn(async move {
                    tokio::time::timeout(timeout, resolver.resolve(&lookup)).await
                });

                let structure = match task.await {
                    Ok(Ok(Ok(structure))) => structure,
                    Ok(Ok(Err(e))) => {
                        debug!("Resolver failed for {:?}: {}", name, e);
                        None
                    }
                    Ok(Err(_)) => {
                        warn!("Resolver failed for {:?}: {}", name, ResolveError::Timeout(timeout));
                        None
                    }
                    Err(e) => {
                        warn!("Resolver task for {:?} aborted: {}", name, e);
                        None
                    }
                };
                structure.map(|s| (name, s))
            }
        })
        .buffer_unordered(config.concurrency.max(1))
        .filter_map(|outcome| async move { outcome })
        .collect()
        .await;

    debug!("Resolved {}/{} candidate names", resolved.len(), requested);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn config(concurrency: usize, timeout_ms: u64) -> ResolverConfig {
        ResolverConfig {
            concurrency,
            timeout_ms,
            ..ResolverConfig::default()
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Fails, hangs or panics depending on the name.
    struct FlakyResolver;

    #[async_trait]
    impl StructureResolver for FlakyResolver {
        async fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
            match name {
                "error" => Err(ResolveError::Status(500)),
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(Some("C".to_string()))
                }
                "panic" => panic!("resolver bug"),
                "unknown" => Ok(None),
                other => Ok(Some(format!("SMILES({other})"))),
            }
        }
    }

    /// Records the peak number of concurrent calls.
    #[derive(Default)]
    struct CountingResolver {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl StructureResolver for CountingResolver {
        async fn resolve(&self, name: &str) -> Result<Option<String>, ResolveError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(name.to_uppercase()))
        }
    }

    #[tokio::test]
    async fn test_static_resolver() {
        let resolver: StaticResolver = [("ethanol", "CCO")].into_iter().collect();
        assert_eq!(resolver.resolve("ethanol").await.unwrap(), Some("CCO".to_string()));
        assert_eq!(resolver.resolve("Ethanol").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failures_only_affect_their_own_name() {
        let resolver: Arc<dyn StructureResolver> = Arc::new(FlakyResolver);
        let resolved = resolve_batch(
            resolver,
            names(&["ethanol", "error", "slow", "panic", "unknown", "methane"]),
            &config(4, 100),
        )
        .await;

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved["ethanol"], "SMILES(ethanol)");
        assert_eq!(resolved["methane"], "SMILES(methane)");
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let counting = Arc::new(CountingResolver::default());
        let resolver: Arc<dyn StructureResolver> = counting.clone();
        let batch: Vec<String> = (0..12).map(|i| format!("name{i}")).collect();

        let resolved = resolve_batch(resolver, batch, &config(3, 5_000)).await;

        assert_eq!(resolved.len(), 12);
        assert_eq!(resolved["name7"], "NAME7");
        let peak = counting.peak.load(Ordering::SeqCst);
        assert!((1..=3).contains(&peak), "peak concurrency {peak}");
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_progresses() {
        let resolver: Arc<dyn StructureResolver> = Arc::new(FlakyResolver);
        let resolved = resolve_batch(resolver, names(&["ethanol"]), &config(0, 1_000)).await;
        assert_eq!(resolved.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let resolver: Arc<dyn StructureResolver> = Arc::new(StaticResolver::new());
        assert!(resolve_batch(resolver, Vec::new(), &ResolverConfig::default()).await.is_empty());
    }

    #[test]
    fn test_structure_url_encodes_name() {
        let opsin = OpsinResolver::new("https://opsin.ch.cam.ac.uk/opsin").unwrap();
        assert_eq!(
            opsin.structure_url("benzoic acid").unwrap().as_str(),
            "https://opsin.ch.cam.ac.uk/opsin/benzoic%20acid.smi"
        );

        let trailing = OpsinResolver::new("https://opsin.ch.cam.ac.uk/opsin/").unwrap();
        assert_eq!(
            trailing.structure_url("1,4-dichlorobenzene").unwrap().as_str(),
            "https://opsin.ch.cam.ac.uk/opsin/1,4-dichlorobenzene.smi"
        );
    }

    #[test]
    fn test_structure_url_rejects_empty_name() {
        let opsin = OpsinResolver::new("https://opsin.ch.cam.ac.uk/opsin").unwrap();
        assert!(matches!(opsin.structure_url("  "), Err(ResolveError::InvalidName(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(OpsinResolver::new("not a url"), Err(ResolveError::InvalidUrl(_))));
        assert!(matches!(OpsinResolver::new("mailto:opsin@example.org"), Err(ResolveError::InvalidUrl(_))));
    }
}
