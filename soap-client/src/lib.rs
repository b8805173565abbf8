//! Private SOAP client for UPnP device communication
//!
//! This crate builds SOAP envelopes and posts them to a device control URL.
//! It knows nothing about specific services: callers supply the control URL,
//! service URI, action name and payload fragment.
//!
//! Two calling styles are offered:
//! - [`SoapClient::call`] returns a typed `Result`
//! - [`SoapClient::send`] never fails; network errors come back as a text
//!   marker (see [`error_marker`]) that no XML parser will accept

mod envelope;
mod error;

pub use envelope::{build_envelope, soap_action_header, ENCODING_STYLE, ENVELOPE_NAMESPACE};
pub use error::SoapError;

use std::time::Duration;

/// Timeout applied to every SOAP round trip
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Content type sent with every SOAP request
pub const CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

/// Prefix of the text returned by [`SoapClient::send`] on network failure
pub const ERROR_MARKER_PREFIX: &str = "SOAP-ERROR:";

/// A fully prepared SOAP POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapRequest {
    /// Absolute control URL
    pub url: String,
    /// Value for the `SOAPACTION` header (already quoted)
    pub soap_action: String,
    /// Complete envelope
    pub body: String,
}

/// The HTTP exchange underneath the SOAP client
///
/// Implementations return the response body for 2xx statuses,
/// `SoapError::Status` for other statuses, and `SoapError::Network` when
/// no response arrived at all.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait HttpTransport: Send + Sync {
    fn post(&self, request: &SoapRequest) -> Result<String, SoapError>;
}

/// Blocking HTTP transport backed by a `ureq` agent
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HttpTransport for UreqTransport {
    fn post(&self, request: &SoapRequest) -> Result<String, SoapError> {
        let result = self
            .agent
            .post(&request.url)
            .set("Content-Type", CONTENT_TYPE)
            .set("SOAPACTION", &request.soap_action)
            .send_string(&request.body);

        match result {
            Ok(response) => response
                .into_string()
                .map_err(|e| SoapError::Network(e.to_string())),
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(SoapError::Status { code, body })
            }
            Err(e) => Err(SoapError::Network(e.to_string())),
        }
    }
}

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient<T = UreqTransport> {
    transport: T,
}

impl SoapClient {
    /// Create a new SOAP client with the default timeout
    pub fn new() -> Self {
        Self::with_transport(UreqTransport::default())
    }

    /// Create a SOAP client with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_transport(UreqTransport::new(timeout))
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HttpTransport> SoapClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Post an action and return the raw response text
    ///
    /// # Arguments
    /// * `control_url` - Absolute control URL of the service
    /// * `service_uri` - Service identifier, e.g. `urn:schemas-upnp-org:service:AVTransport:1`
    /// * `action` - SOAP action name
    /// * `payload` - XML fragment placed inside the action element
    pub fn call(
        &self,
        control_url: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<String, SoapError> {
        let request = SoapRequest {
            url: control_url.to_string(),
            soap_action: soap_action_header(service_uri, action),
            body: build_envelope(action, service_uri, payload),
        };

        tracing::debug!(url = %request.url, action, "sending SOAP action");
        self.transport.post(&request)
    }

    /// Post an action, folding every failure into the returned text
    ///
    /// Non-success statuses still yield the device's body. Network failures
    /// yield [`error_marker`] text instead.
    pub fn send(&self, control_url: &str, service_uri: &str, action: &str, payload: &str) -> String {
        match self.call(control_url, service_uri, action, payload) {
            Ok(body) => body,
            Err(SoapError::Status { code, body }) => {
                tracing::debug!(action, code, "device returned error status");
                body
            }
            Err(e) => {
                tracing::warn!(action, error = %e, "SOAP action failed");
                error_marker(&e)
            }
        }
    }
}

/// Text standing in for a response that never arrived
pub fn error_marker(error: &SoapError) -> String {
    format!("{} Connection failed: {}", ERROR_MARKER_PREFIX, error)
}

/// Whether `text` was produced by [`error_marker`]
pub fn is_error_marker(text: &str) -> bool {
    text.starts_with(ERROR_MARKER_PREFIX)
}
