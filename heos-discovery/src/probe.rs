//! HTTP probing of the well-known description document paths.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::device::DeviceDescription;
use crate::error::{DiscoveryError, Result};

/// Paths tried, in order, when looking for the description document
pub const DESCRIPTION_PATHS: &[&str] = &[
    "upnp/desc/aios_device/aios_device.xml",
    "description.xml",
    "xml/device_description.xml",
    "DeviceDescription.xml",
];

/// Fetches description documents from one device
pub struct DescriptionProbe {
    http_client: reqwest::blocking::Client,
}

impl DescriptionProbe {
    /// Create a probe whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Fetch and parse the document at `url`
    pub fn fetch(&self, url: &str) -> Result<DeviceDescription> {
        let response = self
            .http_client
            .get(url)
            .send()
            .map_err(|e| DiscoveryError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DiscoveryError::NetworkError(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let xml = response
            .text()
            .map_err(|e| DiscoveryError::NetworkError(e.to_string()))?;

        DeviceDescription::from_xml(&xml)
    }

    /// Try each of [`DESCRIPTION_PATHS`] and return the first document that parses
    pub fn probe(&self, host: &str, port: u16) -> Result<DeviceDescription> {
        for path in DESCRIPTION_PATHS {
            let url = format!("http://{}:{}/{}", host, port, path);
            match self.fetch(&url) {
                Ok(description) => {
                    tracing::debug!(%url, "found device description");
                    return Ok(description);
                }
                Err(e) => tracing::debug!(%url, error = %e, "no description at path"),
            }
        }

        Err(DiscoveryError::NotFound(format!("{}:{}", host, port)))
    }
}

/// Whether a TCP connection to `host:port` can be opened within `timeout`
pub fn check_device_connection(host: &str, port: u16, timeout: Duration) -> bool {
    let addrs: Vec<SocketAddr> = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs.collect(),
        Err(e) => {
            tracing::warn!(host, port, error = %e, "Error checking connection");
            return false;
        }
    };

    addrs
        .iter()
        .any(|addr| TcpStream::connect_timeout(addr, timeout).is_ok())
}
