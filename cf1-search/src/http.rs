//! Shared HTTP client for provider requests.
//!
//! One [`reqwest::Client`] is built per search instance and cloned into every
//! adapter handle; clones share the connection pool.

use crate::config::SearchConfig;
use crate::error::SearchError;
use std::time::Duration;

/// User-Agent sent when the config does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("cf1-search/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] configured for provider calls.
///
/// The client has:
/// - Timeout from config (the adapter layer also enforces it)
/// - The configured User-Agent, or [`DEFAULT_USER_AGENT`]
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Join `path` onto a provider base URL without doubling slashes.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
