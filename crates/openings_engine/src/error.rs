use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by the HTTP collaborator. Retries, if any, happen below
/// this layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("server answered with HTTP {status}")]
    Status { status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout)
    }
}

/// A book query that did not produce a result. The orchestration layer treats
/// this as "no candidates" and lets the engine search.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("book query to {endpoint} failed")]
    QueryFailed {
        endpoint: String,
        #[source]
        source: TransportError,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine failure: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}
