//! Transport status parsing
//!
//! Firmware revisions disagree on namespace prefixes, so fields are located
//! by local tag name anywhere in the document rather than by path.

use serde::Serialize;

use crate::xml;

/// Placeholder for a field the response did not contain
pub const NOT_AVAILABLE: &str = "N/A";

const TRANSPORT_STATE_TAG: &str = "CurrentTransportState";
const TRANSPORT_STATUS_TAG: &str = "CurrentTransportStatus";
const SPEED_TAG: &str = "CurrentSpeed";

/// Playback fields reported by `GetTransportInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportStatus {
    pub transport_state: String,
    pub transport_status: String,
    pub playback_speed: String,
}

/// Result of parsing a `GetTransportInfo` response
///
/// Either every field is populated (missing ones hold [`NOT_AVAILABLE`]) or
/// the whole record is the error variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatusRecord {
    Status(TransportStatus),
    Error {
        /// Diagnostic describing why the response was rejected
        message: String,
        /// The response text exactly as received
        raw_response: String,
    },
}

impl StatusRecord {
    /// Parse a raw response body. Never fails: unparseable input becomes
    /// [`StatusRecord::Error`] holding the original text.
    pub fn parse(raw: &str) -> Self {
        match xml::parse(raw) {
            Ok(root) => {
                let field = |tag: &str| {
                    xml::find_text(&root, tag).unwrap_or_else(|| NOT_AVAILABLE.to_string())
                };

                StatusRecord::Status(TransportStatus {
                    transport_state: field(TRANSPORT_STATE_TAG),
                    transport_status: field(TRANSPORT_STATUS_TAG),
                    playback_speed: field(SPEED_TAG),
                })
            }
            Err(e) => StatusRecord::Error {
                message: format!("Failed to parse SOAP response: {}", e),
                raw_response: raw.to_string(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusRecord::Error { .. })
    }

    pub fn status(&self) -> Option<&TransportStatus> {
        match self {
            StatusRecord::Status(status) => Some(status),
            StatusRecord::Error { .. } => None,
        }
    }

    /// Labelled fields for display
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            StatusRecord::Status(status) => vec![
                ("Transport State", status.transport_state.as_str()),
                ("Transport Status", status.transport_status.as_str()),
                ("Playback Speed", status.playback_speed.as_str()),
            ],
            StatusRecord::Error {
                message,
                raw_response,
            } => vec![("Error", message.as_str()), ("Raw Response", raw_response.as_str())],
        }
    }
}
