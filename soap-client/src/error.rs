//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network-level failure: timeout, refused connection, DNS, unreadable body
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The device answered with a non-success HTTP status
    ///
    /// The body is kept because UPnP devices report faults as a SOAP
    /// `Fault` document alongside a 500 status.
    #[error("HTTP status {code}")]
    Status { code: u16, body: String },
}
