//! SOAP envelope construction

/// SOAP 1.1 envelope namespace
pub const ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.1 encoding style
pub const ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Build the SOAP envelope for a UPnP action.
///
/// The action appears as the name of the `u:`-prefixed element inside the
/// body, bound to `service_uri`. `payload` is embedded verbatim: it must
/// already be valid XML content.
///
/// # Example
///
/// ```
/// use soap_client::build_envelope;
///
/// let envelope = build_envelope(
///     "Play",
///     "urn:schemas-upnp-org:service:AVTransport:1",
///     "<InstanceID>0</InstanceID><Speed>1</Speed>",
/// );
/// assert!(envelope.contains(r#"<u:Play xmlns:u="urn:schemas-upnp-org:service:AVTransport:1">"#));
/// assert!(envelope.contains("</u:Play>"));
/// ```
pub fn build_envelope(action: &str, service_uri: &str, payload: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="{ENVELOPE_NAMESPACE}" s:encodingStyle="{ENCODING_STYLE}">
  <s:Body>
    <u:{action} xmlns:u="{service_uri}">
      {payload}
    </u:{action}>
  </s:Body>
</s:Envelope>"#
    )
}

/// Value of the `SOAPACTION` header for an action
pub fn soap_action_header(service_uri: &str, action: &str) -> String {
    format!("\"{}#{}\"", service_uri, action)
}
