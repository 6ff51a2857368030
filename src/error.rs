//! Error types for the cf1-market host layer.

/// Errors raised while loading configuration or serving the host bridge.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host configuration file could not be parsed or is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bridge message could not be decoded, encoded or written.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The search engine could not be built.
    #[error("search error: {0}")]
    Search(#[from] cf1_search::SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config() {
        let err = HostError::Config("expected a table".into());
        assert_eq!(err.to_string(), "config error: expected a table");
    }

    #[test]
    fn search_error_converts() {
        let err: HostError = cf1_search::SearchError::Config("timeout_seconds must be greater than 0".into()).into();
        assert_eq!(
            err.to_string(),
            "search error: config error: timeout_seconds must be greater than 0"
        );
    }

    #[test]
    fn io_error_converts() {
        let err: HostError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into();
        assert!(err.to_string().starts_with("I/O error:"));
    }
}
