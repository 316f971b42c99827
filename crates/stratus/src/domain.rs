//! Logical index name → remote CloudSearch domain id.
//!
//! Remote domains are named `{prefix}-{model-name}` and addressed through an id that only
//! the management API knows. Looking it up costs a round trip, so [`DomainResolver`] keeps
//! the answers in a shared map.

use std::sync::{Arc, PoisonError, RwLock};

use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::error::{Result, StratusError};

static ACRONYM_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("static regex is valid"));
static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("static regex is valid"));

const SEARCH_HOST_PREFIX: &str = "search-";

/// `TestModel` → `test_model`, `HTTPRequest` → `http_request`, `lance-event` → `lance_event`.
pub fn underscore(name: &str) -> String {
    let name = ACRONYM_BOUNDARY.replace_all(name, "${1}_${2}");
    let name = WORD_BOUNDARY.replace_all(&name, "${1}_${2}");
    name.replace("::", "/").replace('-', "_").to_lowercase()
}

/// Remote domain name for a logical index: `("dev", "TestModel")` → `dev-test-model`.
///
/// Only the first underscore becomes a dash.
pub fn safe_domain_name(prefix: &str, logical: &str) -> String {
    format!("{prefix}-{}", underscore(logical).replacen('_', "-", 1))
}

/// Domain id from a search endpoint such as
/// `search-dev-test-model-abc123.us-east-1.cloudsearch.amazonaws.com`.
pub fn domain_id_from_endpoint(endpoint: &str) -> Option<&str> {
    let host = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    host.split('.')
        .next()?
        .strip_prefix(SEARCH_HOST_PREFIX)
        .filter(|id| !id.is_empty())
}

/// Looks up the search endpoint of a remote domain by its full name.
pub trait DomainDiscovery: Send + Sync {
    fn search_endpoint(&self, domain_name: &str) -> anyhow::Result<String>;
}

impl<F> DomainDiscovery for F
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    fn search_endpoint(&self, domain_name: &str) -> anyhow::Result<String> {
        self(domain_name)
    }
}

/// Domain name to remote id, shareable between resolvers.
pub type DomainCache = Arc<RwLock<AHashMap<String, String>>>;

/// Memoizing resolver. Concurrent first lookups may both hit discovery; the first answer
/// stored wins and every caller sees it.
pub struct DomainResolver<D> {
    prefix: String,
    discovery: D,
    cache: DomainCache,
}

impl<D: DomainDiscovery> DomainResolver<D> {
    pub fn new(prefix: impl Into<String>, discovery: D) -> Self {
        Self::with_cache(prefix, discovery, DomainCache::default())
    }

    /// Share `cache` with other resolvers.
    pub fn with_cache(prefix: impl Into<String>, discovery: D, cache: DomainCache) -> Self {
        Self {
            prefix: prefix.into(),
            discovery,
            cache,
        }
    }

    pub fn cache(&self) -> &DomainCache {
        &self.cache
    }

    /// Remote id for the index named `logical`, asking discovery only on a cache miss.
    #[instrument(skip(self), level = "debug")]
    pub fn resolve(&self, logical: &str) -> Result<String> {
        let name = safe_domain_name(&self.prefix, logical);
        if let Some(id) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name)
        {
            debug!(domain = %name, "Domain id cached");
            return Ok(id.clone());
        }

        let endpoint =
            self.discovery
                .search_endpoint(&name)
                .map_err(|cause| StratusError::DomainDiscovery {
                    domain: name.clone(),
                    cause,
                })?;
        let id = domain_id_from_endpoint(&endpoint)
            .ok_or_else(|| StratusError::DomainDiscovery {
                domain: name.clone(),
                cause: anyhow::anyhow!("Unexpected search endpoint `{endpoint}`"),
            })?
            .to_owned();
        info!(domain = %name, id = %id, "Resolved domain id");

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(name).or_insert(id).clone())
    }
}
