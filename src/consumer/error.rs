//! Consumer error types

use thiserror::Error;

/// Errors raised by the consumer and its message stream
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// Invalid configuration
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Client creation or subscription failed
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// Fetching the next message failed
    #[error("fetch error: {0}")]
    FetchError(String),

    /// Committing an offset failed
    #[error("commit error: {0}")]
    CommitError(String),
}

/// Result type for consumer operations
pub type ConsumerResult<T> = Result<T, ConsumerError>;
