use std::fmt;

use crate::service::Service;

/// Network location of one receiver
///
/// Immutable once built. Pointing at another device means building a new
/// [`HeosDevice`](crate::HeosDevice).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceEndpoint {
    host: String,
    port: u16,
}

impl DeviceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `http://{host}:{port}`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Absolute control URL for a service on this device
    pub fn control_url(&self, service: Service) -> String {
        format!("{}/{}", self.base_url(), service.info().control_path)
    }
}

impl fmt::Display for DeviceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
