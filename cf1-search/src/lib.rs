//! # cf1-search
//!
//! Investment-opportunity search across market-data providers.
//!
//! A query names a category (real estate, stocks, commodities, energy,
//! business, or anything else for a general search) and free text. The
//! crate routes it to every provider serving that category, concatenates
//! their results, ranks them against the query, and caches the ranked list.
//!
//! ## Design
//!
//! - One adapter per provider translates between [`OpportunityQuery`] /
//!   [`Opportunity`] and the provider's HTTP contract
//! - Adapters for one route run concurrently, each under a timeout
//! - Per-provider rate limits (per minute and per day) are enforced locally
//! - Unconfigured, rate-limited or failing providers degrade to
//!   deterministic synthetic results, so a search never fails
//! - Ranked results are cached in a bounded [`moka`] cache
//!
//! ## Security
//!
//! - API keys are never logged and are redacted from `Debug` output
//! - Query text is logged only at trace level
//! - No network listeners; this is a library

pub mod adapter;
pub mod adapters;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod provider;
pub mod query;
pub mod rate_limit;
pub mod synthetic;
pub mod types;

pub use adapter::{AdapterHandle, FetchRequest, ProviderAdapter};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use orchestrator::search::MarketSearch;
pub use provider::{ProviderDescriptor, ProviderId, ProviderRegistry, RateLimit};
pub use query::{AnswerValue, BudgetRange, GuidedAnswer, OpportunityQuery};
pub use rate_limit::{RateLimitWindow, RateLimiter};
pub use types::{
    Category, ContactInfo, Coordinates, DataFreshness, KeyMetric, Location, Opportunity,
    OpportunityType, RiskLevel,
};

/// Run a one-off search with a fresh [`MarketSearch`] built from `config`.
///
/// Long-lived callers should keep a [`MarketSearch`] so the cache and rate
/// limits persist between queries.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. The search itself
/// never fails.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> cf1_search::Result<()> {
/// let query = cf1_search::OpportunityQuery::new("real estate", "rental")
///     .with_location("Austin, TX");
/// let results = cf1_search::search(&query, cf1_search::SearchConfig::default()).await?;
/// for result in &results {
///     println!("{:.2} {}", result.relevance_score, result.title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &OpportunityQuery, config: SearchConfig) -> Result<Vec<Opportunity>> {
    let engine = MarketSearch::new(config)?;
    Ok(engine.search(query).await)
}
