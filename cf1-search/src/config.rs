//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] carries the provider registry input, per-adapter
//! timeouts, result caps, and cache bounds. The defaults run every provider
//! in synthetic mode; callers attach credentials to enable live calls.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use crate::error::SearchError;
use crate::provider::{ProviderDescriptor, ProviderId, RateLimit};
use crate::types::Category;

/// Configuration for a [`crate::MarketSearch`] instance.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Providers in declaration order. Route fan-out and result
    /// concatenation follow this order.
    ///
    /// When deserialized, entries are overrides merged into the built-in
    /// catalog by `id`: only the fields an entry sets change, providers it
    /// does not mention keep their defaults, and `enabled = false` removes
    /// a provider.
    #[serde(deserialize_with = "merge_provider_overrides")]
    pub providers: Vec<ProviderDescriptor>,
    /// Per-adapter live-call timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum results taken from a single adapter call.
    pub results_per_provider: usize,
    /// Maximum results per category on the general route's diversified
    /// fan-out.
    pub fallback_results_per_category: usize,
    /// How long to cache ranked results in seconds. 0 disables time-based
    /// expiry; entries are then only evicted by size.
    pub cache_ttl_seconds: u64,
    /// Maximum number of cached result sets.
    pub cache_max_entries: u64,
    /// Custom User-Agent for provider requests.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            providers: catalog(),
            timeout_seconds: 8,
            results_per_provider: 3,
            fallback_results_per_category: 2,
            cache_ttl_seconds: 3600,
            cache_max_entries: 500,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `providers` must not be empty and must not repeat a provider
    /// - every `base_url` must be an absolute http(s) URL
    /// - every rate limit must allow at least one request per minute and day
    /// - `timeout_seconds`, `results_per_provider`,
    ///   `fallback_results_per_category` and `cache_max_entries` must be > 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.providers.is_empty() {
            return Err(SearchError::Config(
                "at least one provider must be configured".into(),
            ));
        }
        let mut seen = HashSet::new();
        for descriptor in &self.providers {
            if !seen.insert(descriptor.id) {
                return Err(SearchError::Config(format!(
                    "provider {} is configured more than once",
                    descriptor.id.key()
                )));
            }
            validate_base_url(descriptor)?;
            if descriptor.rate_limit.requests_per_minute == 0
                || descriptor.rate_limit.requests_per_day == 0
            {
                return Err(SearchError::Config(format!(
                    "provider {} rate limit must be greater than 0",
                    descriptor.id.key()
                )));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.results_per_provider == 0 {
            return Err(SearchError::Config(
                "results_per_provider must be greater than 0".into(),
            ));
        }
        if self.fallback_results_per_category == 0 {
            return Err(SearchError::Config(
                "fallback_results_per_category must be greater than 0".into(),
            ));
        }
        if self.cache_max_entries == 0 {
            return Err(SearchError::Config(
                "cache_max_entries must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Mutable access to one provider's descriptor.
    pub fn provider_mut(&mut self, id: ProviderId) -> Option<&mut ProviderDescriptor> {
        self.providers.iter_mut().find(|d| d.id == id)
    }
}

fn catalog() -> Vec<ProviderDescriptor> {
    ProviderId::all()
        .iter()
        .map(ProviderId::default_descriptor)
        .collect()
}

/// One `[[providers]]` entry as written in a config file.
#[derive(Debug, Deserialize)]
struct ProviderOverride {
    id: ProviderId,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    rate_limit: Option<RateLimit>,
    #[serde(default)]
    categories: Option<Vec<Category>>,
    #[serde(default)]
    enabled: Option<bool>,
}

fn merge_provider_overrides<'de, D>(deserializer: D) -> Result<Vec<ProviderDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = Vec::<ProviderOverride>::deserialize(deserializer)?;
    let mut providers = Vec::new();
    for mut descriptor in catalog() {
        let mut enabled = true;
        let id = descriptor.id;
        for entry in overrides.iter().filter(|o| o.id == id) {
            if let Some(base_url) = &entry.base_url {
                descriptor.base_url = base_url.clone();
            }
            if let Some(api_key) = &entry.api_key {
                descriptor = descriptor.with_api_key(api_key.clone());
            }
            if let Some(rate_limit) = entry.rate_limit {
                descriptor.rate_limit = rate_limit;
            }
            if let Some(categories) = &entry.categories {
                descriptor.categories = categories.clone();
            }
            if let Some(flag) = entry.enabled {
                enabled = flag;
            }
        }
        if enabled {
            providers.push(descriptor);
        }
    }
    Ok(providers)
}

fn validate_base_url(descriptor: &ProviderDescriptor) -> Result<(), SearchError> {
    let parsed = url::Url::parse(&descriptor.base_url).map_err(|e| {
        SearchError::Config(format!(
            "provider {} base_url is invalid: {e}",
            descriptor.id.key()
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SearchError::Config(format!(
            "provider {} base_url scheme must be http or https, got {other}",
            descriptor.id.key()
        ))),
    }
}
