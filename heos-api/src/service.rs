/// The UPnP services the receiver exposes for control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// AVTransport service - playback (set URI, play, pause, stop, transport info)
    AVTransport,

    /// RenderingControl service - master volume
    RenderingControl,

    /// Denon ACT service - power state
    Act,
}

/// Control path and service URI for a UPnP service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// HTTP control path, relative to the device base URL
    pub control_path: &'static str,

    /// The service URI used in the envelope and `SOAPACTION` header
    pub service_uri: &'static str,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::AVTransport => "AVTransport",
            Service::RenderingControl => "RenderingControl",
            Service::Act => "ACT",
        }
    }

    pub fn info(&self) -> ServiceInfo {
        match self {
            Service::AVTransport => ServiceInfo {
                control_path: "upnp/control/renderer_dvc/AVTransport",
                service_uri: "urn:schemas-upnp-org:service:AVTransport:1",
            },
            Service::RenderingControl => ServiceInfo {
                control_path: "upnp/control/renderer_dvc/RenderingControl",
                service_uri: "urn:schemas-upnp-org:service:RenderingControl:1",
            },
            Service::Act => ServiceInfo {
                control_path: "ACT/control",
                service_uri: "urn:schemas-denon-com:service:ACT:1",
            },
        }
    }
}
