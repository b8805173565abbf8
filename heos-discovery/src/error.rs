//! Error types for device metadata lookup.

use thiserror::Error;

/// Error type for discovery operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Network-related errors (HTTP client creation, requests, connects)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The device answered but the document could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// None of the well-known description paths produced a document
    #[error("No device description found: {0}")]
    NotFound(String),
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
