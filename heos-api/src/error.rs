use soap_client::SoapError;
use thiserror::Error;

/// Errors from the fallible device operations
///
/// The fail-soft facade methods never surface these; they exist for the
/// `try_*`/`volume` variants and for logging what was absorbed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection refused, timeout, DNS failure, or a response body that
    /// could not be read.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The device answered with a non-success HTTP status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Response parsing error
    ///
    /// The response was not well-formed XML or lacked the expected field.
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Status { code, .. } => ApiError::HttpStatus(code),
        }
    }
}
