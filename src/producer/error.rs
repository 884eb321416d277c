//! Producer error types

use crate::wire::WireError;
use thiserror::Error;

/// Errors returned by a publish
#[derive(Debug, Error)]
pub enum ProducerError {
    /// Invalid configuration
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The Kafka client could not be created
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// Article could not be encoded
    #[error("encode error: {0}")]
    Encode(#[from] WireError),

    /// The broker rejected or failed to acknowledge the write
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Flushing outstanding writes failed on close
    #[error("flush failed: {0}")]
    Flush(String),
}

/// Result type for producer operations
pub type ProducerResult<T> = Result<T, ProducerError>;
