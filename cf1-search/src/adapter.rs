//! Provider adapter contract and the uniform fetch-with-fallback driver.
//!
//! Each provider (RentCast, ATTOM, Alpha Vantage, ...) implements
//! [`ProviderAdapter`] to translate between the universal query/result
//! shapes and its own HTTP contract. [`AdapterHandle`] binds an adapter to
//! its descriptor, the shared rate limiter, and the HTTP client, and runs
//! the same degrade-to-synthetic sequence for every provider.

use std::sync::Arc;
use std::time::Duration;

use crate::error::SearchError;
use crate::provider::{ProviderDescriptor, ProviderId};
use crate::query::OpportunityQuery;
use crate::rate_limit::RateLimiter;
use crate::types::{Category, Opportunity};

/// What the router asks an adapter for.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub query: &'a OpportunityQuery,
    /// Route the adapter is serving. A multi-category provider shapes its
    /// request and synthetic output by this.
    pub category: Category,
    /// Maximum number of results wanted.
    pub limit: usize,
}

/// A pluggable market-data provider backend.
///
/// Implementors only translate; transport, rate limiting, timeouts and
/// fallback are handled by [`AdapterHandle`]. Each adapter handles its own:
///
/// - Request construction (path, query parameters, credential placement)
/// - Parsing of the native response into [`Opportunity`] values
/// - A deterministic synthetic generator for degraded mode
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter speaks for.
    fn provider(&self) -> ProviderId;

    /// Build the live request for `request`.
    fn build_request(
        &self,
        client: &reqwest::Client,
        descriptor: &ProviderDescriptor,
        api_key: &str,
        request: &FetchRequest<'_>,
    ) -> reqwest::RequestBuilder;

    /// Translate a successful response body.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Parse`] if the body does not match the
    /// provider's response shape.
    fn parse_response(
        &self,
        body: &str,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError>;

    /// Deterministic, query-sensitive results used when the provider is
    /// unconfigured, rate limited, or failing.
    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity>;
}

/// An adapter bound to everything it needs to run a fetch.
///
/// Cheap to clone; clones share the adapter, descriptor, limiter and
/// connection pool.
#[derive(Clone)]
pub struct AdapterHandle {
    adapter: Arc<dyn ProviderAdapter>,
    descriptor: Arc<ProviderDescriptor>,
    limiter: Arc<RateLimiter>,
    client: reqwest::Client,
    timeout: Duration,
}

impl AdapterHandle {
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        descriptor: ProviderDescriptor,
        limiter: Arc<RateLimiter>,
        client: reqwest::Client,
        timeout: Duration,
    ) -> Self {
        Self {
            adapter,
            descriptor: Arc::new(descriptor),
            limiter,
            client,
            timeout,
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.descriptor.id
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    /// Fetch opportunities for `request`. Never fails.
    ///
    /// 1. No credential: return synthetic results without touching the
    ///    network or the rate limiter.
    /// 2. Rate limiter denies: return synthetic results.
    /// 3. Otherwise call the provider under the timeout; any transport,
    ///    status, parse or timeout failure is logged and replaced by
    ///    synthetic results.
    pub async fn fetch(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        let provider = self.provider();

        let Some(api_key) = self.descriptor.credential() else {
            tracing::trace!(%provider, "no credential; using synthetic results");
            return self.synthesize(request);
        };

        if !self.limiter.allow(provider) {
            tracing::debug!(%provider, "rate limited; using synthetic results");
            return self.synthesize(request);
        }

        let outcome = match tokio::time::timeout(self.timeout, self.call_live(api_key, request)).await
        {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout(format!(
                "{provider} exceeded {}s",
                self.timeout.as_secs()
            ))),
        };

        match outcome {
            Ok(mut results) => {
                results.truncate(request.limit);
                tracing::debug!(%provider, count = results.len(), "provider returned results");
                results
            }
            Err(err) => {
                tracing::warn!(%provider, error = %err, "provider call failed; using synthetic results");
                self.synthesize(request)
            }
        }
    }

    async fn call_live(
        &self,
        api_key: &str,
        request: &FetchRequest<'_>,
    ) -> Result<Vec<Opportunity>, SearchError> {
        let provider = self.provider();
        tracing::trace!(%provider, query = %request.query.query, "provider request");

        let response = self
            .adapter
            .build_request(&self.client, &self.descriptor, api_key, request)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("{provider} request failed: {}", e.without_url())))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("{provider} HTTP error: {}", e.without_url())))?;

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("{provider} response read failed: {e}")))?;

        tracing::trace!(%provider, bytes = body.len(), "provider response received");

        self.adapter.parse_response(&body, request)
    }

    fn synthesize(&self, request: &FetchRequest<'_>) -> Vec<Opportunity> {
        let mut results = self.adapter.synthesize(request);
        results.truncate(request.limit);
        results
    }
}

impl std::fmt::Debug for AdapterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterHandle")
            .field("descriptor", &self.descriptor)
            .field("timeout", &self.timeout)
            .finish()
    }
}
