//! Error types for the cf1-search crate.
//!
//! Errors only cross internal seams: provider live calls and construction
//! time config validation. [`crate::MarketSearch::search`] never returns one;
//! every failure below it resolves to synthetic results. No API keys appear
//! in error messages.

/// Errors that can occur inside the search pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to a provider failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A provider response could not be translated into opportunities.
    #[error("parse error: {0}")]
    Parse(String),

    /// A provider call exceeded the per-adapter timeout.
    #[error("provider timed out: {0}")]
    Timeout(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for cf1-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
