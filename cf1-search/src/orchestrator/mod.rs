//! Search orchestrator: routing, concurrent fan-out, dedup, scoring, caching.
//!
//! [`search::MarketSearch`] checks the result cache, hands misses to the
//! [`router::CategoryRouter`], ranks the concatenated output with the
//! relevance scorer, and caches the ranked list.

pub mod dedup;
pub mod router;
pub mod scoring;
pub mod search;
pub mod url_normalize;
