//! # cf1-market
//!
//! Host layer for [`cf1_search`]: loads the search configuration from TOML,
//! resolves provider credentials from the environment, and serves searches
//! to a host process over a newline-delimited JSON bridge.
//!
//! The `cf1-search-host` binary wires these together over stdin/stdout.

pub mod bridge;
pub mod config;
pub mod error;

pub use bridge::{CommandEnvelope, CommandName, ResponseEnvelope, run_bridge, run_stdio_bridge};
pub use config::HostConfig;
pub use error::{HostError, Result};
