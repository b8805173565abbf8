//! The device facade
//!
//! [`HeosDevice`] is the one entry point the dashboard uses. Every public
//! operation is fail-soft: transport and parse failures come back as a
//! placeholder value appropriate to the return type, never as an error.
//! Fallible variants (`volume`, `try_set_volume`, `execute`) are available
//! for callers that want the reason.

use soap_client::{HttpTransport, SoapClient, UreqTransport};

use crate::endpoint::DeviceEndpoint;
use crate::error::{ApiError, Result};
use crate::operation::SoapAction;
use crate::operations::{av_transport, power, rendering_control};
use crate::service::Service;
use crate::status::StatusRecord;
use crate::xml;

/// Volume reported when the device cannot be read
pub const FALLBACK_VOLUME: &str = "0";

/// Playback speed sent with `Play`
const NORMAL_SPEED: &str = "1";

/// Control facade for one receiver
///
/// Holds nothing mutable: the endpoint is fixed at construction and every
/// call performs its own round trip.
///
/// # Example
/// ```rust,no_run
/// use heos_api::HeosDevice;
///
/// let device = HeosDevice::new("10.20.30.40", 60006);
/// if device.check_connection() {
///     device.set_stream_uri("https://npr-ice.streamguys1.com/live.mp3");
///     device.play();
///     println!("volume: {}", device.get_volume());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HeosDevice<T = UreqTransport> {
    endpoint: DeviceEndpoint,
    client: SoapClient<T>,
}

impl HeosDevice {
    /// Create a facade for the device at `host:port` with the default transport
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_client(DeviceEndpoint::new(host, port), SoapClient::new())
    }
}

impl<T: HttpTransport> HeosDevice<T> {
    /// Create a facade over a custom SOAP client
    pub fn with_client(endpoint: DeviceEndpoint, client: SoapClient<T>) -> Self {
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    /// Send an arbitrary action and return the raw response text
    ///
    /// Without an override the AVTransport control URL is used. Network
    /// failures produce the transport's error marker text.
    pub fn send_action(
        &self,
        action: &str,
        payload: &str,
        service_uri: &str,
        control_url: Option<&str>,
    ) -> String {
        let default_url;
        let url = match control_url {
            Some(url) => url,
            None => {
                default_url = self.endpoint.control_url(Service::AVTransport);
                &default_url
            }
        };
        self.client.send(url, service_uri, action, payload)
    }

    /// Send a typed action, returning the raw response text
    pub fn execute<Op: SoapAction>(&self, request: &Op::Request) -> Result<String> {
        let info = Op::SERVICE.info();
        let url = self.endpoint.control_url(Op::SERVICE);
        let payload = Op::build_payload(request);

        tracing::debug!(
            device = %self.endpoint,
            service = Op::SERVICE.name(),
            action = Op::ACTION,
            "executing action"
        );

        self.client
            .call(&url, info.service_uri, Op::ACTION, &payload)
            .map_err(ApiError::from)
    }

    /// Send a typed action through the fail-soft path
    fn dispatch<Op: SoapAction>(&self, request: &Op::Request) -> String {
        let info = Op::SERVICE.info();
        let url = self.endpoint.control_url(Op::SERVICE);
        self.send_action(Op::ACTION, &Op::build_payload(request), info.service_uri, Some(&url))
    }

    /// Load a stream URI into the transport
    pub fn set_stream_uri(&self, uri: &str) -> String {
        self.dispatch::<av_transport::SetAvTransportUri>(&av_transport::set_av_transport_uri(
            uri.to_string(),
        ))
    }

    pub fn play(&self) -> String {
        self.dispatch::<av_transport::Play>(&av_transport::play(NORMAL_SPEED.to_string()))
    }

    pub fn pause(&self) -> String {
        self.dispatch::<av_transport::Pause>(&av_transport::pause())
    }

    pub fn stop(&self) -> String {
        self.dispatch::<av_transport::Stop>(&av_transport::stop())
    }

    /// Switch the receiver to standby through the ACT service
    pub fn power_off(&self) -> String {
        self.dispatch::<power::PutPowerState>(&power::power_off())
    }

    /// Current transport state, or the error variant when the device could
    /// not be reached or answered with something unparseable
    pub fn get_status(&self) -> StatusRecord {
        let raw = self.dispatch::<av_transport::GetTransportInfo>(&av_transport::get_transport_info());
        StatusRecord::parse(&raw)
    }

    /// Current master volume
    pub fn volume(&self) -> Result<String> {
        let request = rendering_control::get_volume(rendering_control::MASTER_CHANNEL.to_string());
        let raw = self.execute::<rendering_control::GetVolume>(&request)?;

        let root = xml::parse(&raw).map_err(|e| ApiError::ParseError(e.to_string()))?;
        xml::find_text(&root, "CurrentVolume")
            .ok_or_else(|| ApiError::ParseError("Missing CurrentVolume element".to_string()))
    }

    /// Current master volume, or `"0"` when it cannot be read
    pub fn get_volume(&self) -> String {
        self.volume().unwrap_or_else(|e| {
            tracing::warn!(device = %self.endpoint, error = %e, "Error getting volume");
            FALLBACK_VOLUME.to_string()
        })
    }

    /// Set the master volume; `level` is passed through unvalidated
    pub fn try_set_volume(&self, level: &str) -> Result<()> {
        let request = rendering_control::set_volume(
            rendering_control::MASTER_CHANNEL.to_string(),
            level.to_string(),
        );
        self.execute::<rendering_control::SetVolume>(&request).map(|_| ())
    }

    /// Set the master volume, reporting only whether the device accepted it
    pub fn set_volume(&self, level: &str) -> bool {
        match self.try_set_volume(level) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(device = %self.endpoint, error = %e, "Error setting volume");
                false
            }
        }
    }

    /// Whether the device answers `GetTransportInfo` with parseable XML
    pub fn check_connection(&self) -> bool {
        !self.get_status().is_error()
    }
}
