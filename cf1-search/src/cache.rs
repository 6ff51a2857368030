//! Bounded in-memory cache of ranked results.
//!
//! Caches the final scored result list keyed by the query signature
//! (category, text, location, budget range). Uses [`moka`] for
//! async-friendly concurrent access with size-bounded eviction and an
//! optional TTL. Each [`ResultCache`] is owned by one search instance.

use std::time::Duration;

use moka::future::Cache;

use crate::query::OpportunityQuery;
use crate::types::Opportunity;

/// Deterministic cache signature of a query.
///
/// Guided answers and free-form filters are not part of the signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased, trimmed category string.
    category: String,
    /// Lowercased query text with whitespace collapsed.
    query: String,
    /// Lowercased, trimmed location, if any.
    location: Option<String>,
    /// Bit patterns of the budget bounds, if any.
    budget: Option<(u64, u64)>,
}

impl CacheKey {
    /// Build the signature for `query`.
    ///
    /// Case and surrounding whitespace do not affect the signature.
    pub fn new(query: &OpportunityQuery) -> Self {
        Self {
            category: query.category.trim().to_lowercase(),
            query: query.terms().join(" "),
            location: query
                .location
                .as_deref()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty()),
            budget: query
                .budget_range
                .map(|b| (normalise_zero(b.min).to_bits(), normalise_zero(b.max).to_bits())),
        }
    }
}

/// Folds `-0.0` into `0.0` so both sign bits hash alike.
fn normalise_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Concurrent signature → ranked results store.
///
/// Writes to the same key are last-writer-wins.
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<CacheKey, Vec<Opportunity>>,
}

impl ResultCache {
    /// Create a cache holding at most `max_entries` result sets.
    ///
    /// `ttl_seconds == 0` disables time-based expiry.
    pub fn new(max_entries: u64, ttl_seconds: u64) -> Self {
        let mut builder = Cache::builder().max_capacity(max_entries);
        if ttl_seconds > 0 {
            builder = builder.time_to_live(Duration::from_secs(ttl_seconds));
        }
        Self {
            inner: builder.build(),
        }
    }

    /// Look up cached results. Returns `None` on miss.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<Opportunity>> {
        self.inner.get(key).await
    }

    /// Store ranked results under `key`.
    pub async fn insert(&self, key: CacheKey, results: Vec<Opportunity>) {
        self.inner.insert(key, results).await;
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Number of live entries after pending maintenance has run.
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpportunityType;

    fn opportunity(title: &str) -> Opportunity {
        Opportunity::new(
            format!("test-{title}"),
            title,
            "cached",
            OpportunityType::Business,
            "Test",
        )
    }

    #[test]
    fn cache_key_deterministic_for_same_inputs() {
        let q = OpportunityQuery::new("real estate", "rental").with_location("Austin, TX");
        assert_eq!(CacheKey::new(&q), CacheKey::new(&q.clone()));
    }

    #[test]
    fn cache_key_differs_when_query_differs() {
        let a = OpportunityQuery::new("stocks", "ai");
        let b = OpportunityQuery::new("stocks", "dividend");
        assert_ne!(CacheKey::new(&a), CacheKey::new(&b));
    }

    #[test]
    fn cache_key_differs_when_location_differs() {
        let a = OpportunityQuery::new("real estate", "rental").with_location("Austin, TX");
        let b = OpportunityQuery::new("real estate", "rental").with_location("Tampa, FL");
        assert_ne!(CacheKey::new(&a), CacheKey::new(&b));
    }

    #[test]
    fn cache_key_differs_when_budget_differs() {
        let a = OpportunityQuery::new("business", "laundromat").with_budget(100_000.0, 300_000.0);
        let b = OpportunityQuery::new("business", "laundromat").with_budget(100_000.0, 500_000.0);
        let c = OpportunityQuery::new("business", "laundromat");
        assert_ne!(CacheKey::new(&a), CacheKey::new(&b));
        assert_ne!(CacheKey::new(&a), CacheKey::new(&c));
    }

    #[test]
    fn cache_key_normalises_case_and_whitespace() {
        let a = OpportunityQuery::new(" Real Estate ", "  Rental   Duplex ").with_location("AUSTIN, TX ");
        let b = OpportunityQuery::new("real estate", "rental duplex").with_location("austin, tx");
        assert_eq!(CacheKey::new(&a), CacheKey::new(&b));
    }

    #[test]
    fn cache_key_ignores_guided_answers() {
        let a = OpportunityQuery::new("energy", "solar");
        let b = OpportunityQuery::new("energy", "solar")
            .with_answer("riskTolerance", crate::query::AnswerValue::Text("low".into()));
        assert_eq!(CacheKey::new(&a), CacheKey::new(&b));
    }

    #[test]
    fn cache_key_blank_location_equals_none() {
        let a = OpportunityQuery::new("energy", "solar").with_location("  ");
        let b = OpportunityQuery::new("energy", "solar");
        assert_eq!(CacheKey::new(&a), CacheKey::new(&b));
    }

    #[tokio::test]
    async fn cache_miss_returns_none() {
        let cache = ResultCache::new(10, 60);
        let key = CacheKey::new(&OpportunityQuery::new("stocks", "nothing here"));
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn cache_insert_and_retrieve() {
        let cache = ResultCache::new(10, 60);
        let key = CacheKey::new(&OpportunityQuery::new("business", "car wash"));
        cache.insert(key.clone(), vec![opportunity("Cached")]).await;

        let cached = cache.get(&key).await.expect("should be cached");
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].title, "Cached");
    }

    #[tokio::test]
    async fn overwrite_same_key_updates_value() {
        let cache = ResultCache::new(10, 0);
        let key = CacheKey::new(&OpportunityQuery::new("business", "franchise"));
        cache.insert(key.clone(), vec![opportunity("Old")]).await;
        cache.insert(key.clone(), vec![opportunity("New")]).await;

        let cached = cache.get(&key).await.expect("should be cached");
        assert_eq!(cached[0].title, "New");
    }

    #[tokio::test]
    async fn clear_drops_all_entries() {
        let cache = ResultCache::new(10, 60);
        let a = CacheKey::new(&OpportunityQuery::new("energy", "wind"));
        let b = CacheKey::new(&OpportunityQuery::new("energy", "solar"));
        cache.insert(a.clone(), vec![opportunity("A")]).await;
        cache.insert(b.clone(), vec![opportunity("B")]).await;
        assert_eq!(cache.entry_count().await, 2);

        cache.clear();
        assert!(cache.get(&a).await.is_none());
        assert!(cache.get(&b).await.is_none());
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn separate_instances_do_not_share_entries() {
        let first = ResultCache::new(10, 60);
        let second = ResultCache::new(10, 60);
        let key = CacheKey::new(&OpportunityQuery::new("commodities", "gold"));
        first.insert(key.clone(), vec![opportunity("Gold")]).await;
        assert!(second.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn size_bound_evicts_beyond_capacity() {
        let cache = ResultCache::new(2, 0);
        for text in ["solar", "wind", "hydro", "geothermal", "battery"] {
            let key = CacheKey::new(&OpportunityQuery::new("energy", text));
            cache.insert(key, vec![opportunity(text)]).await;
        }
        let count = cache.entry_count().await;
        assert!(count <= 2, "cache grew past its bound: {count}");
        assert!(count > 0);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = ResultCache::new(10, 1);
        let key = CacheKey::new(&OpportunityQuery::new("commodities", "silver"));
        cache.insert(key.clone(), vec![opportunity("Silver")]).await;
        assert!(cache.get(&key).await.is_some());

        tokio::time::sleep(Duration::from_millis(1_200)).await;
        assert!(cache.get(&key).await.is_none(), "entry outlived its TTL");
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn zero_ttl_keeps_entries() {
        let cache = ResultCache::new(10, 0);
        let key = CacheKey::new(&OpportunityQuery::new("stocks", "dividend"));
        cache.insert(key.clone(), vec![opportunity("Dividend")]).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(cache.get(&key).await.is_some());
    }
}
