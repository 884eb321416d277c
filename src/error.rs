//! Error types shared across the pipeline
//!
//! Each subsystem owns its error enum; this module gathers them so callers can
//! `use newswire::error::*` at process boundaries.

use std::net::SocketAddr;
use thiserror::Error;

pub use crate::article::ArticleError;
pub use crate::consumer::error::ConsumerError;
pub use crate::producer::error::ProducerError;
pub use crate::wire::WireError;

/// Errors raised while scraping the news site
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("http request to {url} failed: {source}")]
    Http {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with something other than 200
    #[error("unexpected status {status} from {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// A CSS selector failed to compile
    #[error("invalid selector '{selector}': {message}")]
    Selector {
        /// Selector source text
        selector: String,
        /// Parser message
        message: String,
    },

    /// Invalid fetcher configuration
    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Errors raised by the HTTP server
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The listen address could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested listen address
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid server configuration
    #[error("configuration error: {0}")]
    ConfigError(String),
}
