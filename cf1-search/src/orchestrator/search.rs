//! The search entry point: cache, route, score, cache again.

use std::sync::Arc;
use std::time::Duration;

use crate::adapter::{AdapterHandle, ProviderAdapter};
use crate::adapters;
use crate::cache::{CacheKey, ResultCache};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http::build_client;
use crate::provider::{ProviderId, ProviderRegistry};
use crate::query::OpportunityQuery;
use crate::rate_limit::{RateLimitWindow, RateLimiter};
use crate::synthetic::{self, FALLBACK_SOURCE};
use crate::types::{Category, Opportunity};

use super::router::CategoryRouter;
use super::scoring;

/// A market-data search instance.
///
/// Owns its provider registry, rate limiter and result cache; nothing is
/// process-global, so independent instances never share budget or cached
/// results. Safe to share across tasks behind an [`Arc`].
#[derive(Debug)]
pub struct MarketSearch {
    registry: ProviderRegistry,
    limiter: Arc<RateLimiter>,
    cache: ResultCache,
    router: CategoryRouter,
    fallback_results: usize,
}

impl MarketSearch {
    /// Build an instance with the built-in adapter for every configured
    /// provider.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the config is invalid, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        Self::with_adapters(config, Vec::new())
    }

    /// Build an instance, replacing the built-in adapter of each provider
    /// named by an adapter in `overrides`.
    ///
    /// # Errors
    ///
    /// Same as [`MarketSearch::new`].
    pub fn with_adapters(
        config: SearchConfig,
        overrides: Vec<Arc<dyn ProviderAdapter>>,
    ) -> Result<Self, SearchError> {
        config.validate()?;

        let client = build_client(&config)?;
        let registry = ProviderRegistry::new(config.providers.clone());
        let limiter = Arc::new(RateLimiter::from_registry(&registry));
        let timeout = Duration::from_secs(config.timeout_seconds);

        let handles = registry
            .iter()
            .map(|descriptor| {
                let adapter = overrides
                    .iter()
                    .find(|a| a.provider() == descriptor.id)
                    .cloned()
                    .unwrap_or_else(|| adapters::for_provider(descriptor.id));
                AdapterHandle::new(
                    adapter,
                    descriptor.clone(),
                    Arc::clone(&limiter),
                    client.clone(),
                    timeout,
                )
            })
            .collect();

        let live = registry.iter().filter(|d| d.credential().is_some()).count();
        tracing::debug!(providers = registry.len(), live, "market search ready");

        Ok(Self {
            router: CategoryRouter::new(
                handles,
                config.results_per_provider,
                config.fallback_results_per_category,
            ),
            cache: ResultCache::new(config.cache_max_entries, config.cache_ttl_seconds),
            registry,
            limiter,
            fallback_results: config.results_per_provider,
        })
    }

    /// Ranked opportunities for `query`. Never fails.
    ///
    /// A cached result set is returned as-is, without provider calls or
    /// rescoring. Otherwise the query is routed, scored, and the scored
    /// list cached under the query's signature.
    pub async fn search(&self, query: &OpportunityQuery) -> Vec<Opportunity> {
        tracing::trace!(category = %query.category, query = %query.query, "search");
        let key = CacheKey::new(query);
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(count = hit.len(), "cache hit");
            return hit;
        }

        let mut raw = self.router.route(query).await;
        if raw.is_empty() {
            tracing::debug!("route produced nothing; using general fallback");
            raw = synthetic::generate(Category::General, FALLBACK_SOURCE, query, self.fallback_results);
        }

        let scored = scoring::score(raw, query);
        self.cache.insert(key, scored.clone()).await;
        scored
    }

    /// Drop every cached result set.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("result cache cleared");
    }

    /// Current rate-limit counters for `provider`, if it has been called.
    pub fn rate_limit_window(&self, provider: ProviderId) -> Option<RateLimitWindow> {
        self.limiter.window(provider)
    }

    /// Calls `provider` may still make in its current minute window, or
    /// `None` if it has no declared budget.
    pub fn rate_limit_remaining(&self, provider: ProviderId) -> Option<u32> {
        self.limiter.remaining(provider)
    }

    /// Number of cached result sets.
    pub async fn cached_entry_count(&self) -> u64 {
        self.cache.entry_count().await
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Providers the router consults for `category`, in order.
    pub fn providers_for(&self, category: Category) -> Vec<ProviderId> {
        self.router.providers_for(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_search_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MarketSearch>();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..SearchConfig::default()
        };
        let err = MarketSearch::new(config).unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn search_caches_scored_results() {
        let search = MarketSearch::new(SearchConfig::default()).expect("valid config");
        let q = OpportunityQuery::new("energy", "solar").with_location("Phoenix, AZ");
        let first = search.search(&q).await;
        assert!(!first.is_empty());
        assert!(first
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
        assert_eq!(search.cached_entry_count().await, 1);
        assert_eq!(search.search(&q).await, first);
    }

    #[tokio::test]
    async fn clear_cache_empties_store() {
        let search = MarketSearch::new(SearchConfig::default()).expect("valid config");
        search.search(&OpportunityQuery::new("stocks", "dividend")).await;
        search.clear_cache();
        assert_eq!(search.cached_entry_count().await, 0);
    }

    #[test]
    fn remaining_budget_reported_per_provider() {
        let search = MarketSearch::new(SearchConfig::default()).expect("valid config");
        assert_eq!(search.rate_limit_remaining(ProviderId::AlphaVantage), Some(5));

        let mut config = SearchConfig::default();
        config.providers.retain(|d| d.id != ProviderId::Eia);
        let search = MarketSearch::new(config).expect("valid config");
        assert_eq!(search.rate_limit_remaining(ProviderId::Eia), None);
    }

    #[test]
    fn overrides_replace_builtin_adapter() {
        struct Quiet;
        impl ProviderAdapter for Quiet {
            fn provider(&self) -> ProviderId {
                ProviderId::Eia
            }
            fn build_request(
                &self,
                client: &reqwest::Client,
                descriptor: &crate::provider::ProviderDescriptor,
                _api_key: &str,
                _request: &crate::adapter::FetchRequest<'_>,
            ) -> reqwest::RequestBuilder {
                client.get(&descriptor.base_url)
            }
            fn parse_response(
                &self,
                _body: &str,
                _request: &crate::adapter::FetchRequest<'_>,
            ) -> Result<Vec<Opportunity>, SearchError> {
                Ok(Vec::new())
            }
            fn synthesize(&self, _request: &crate::adapter::FetchRequest<'_>) -> Vec<Opportunity> {
                Vec::new()
            }
        }

        let search = MarketSearch::with_adapters(SearchConfig::default(), vec![Arc::new(Quiet)])
            .expect("valid config");
        assert_eq!(search.providers_for(Category::Energy), vec![ProviderId::Eia]);
        assert_eq!(search.registry().len(), ProviderId::all().len());
    }
}
