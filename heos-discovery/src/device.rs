//! Device description parsing.
//!
//! Fields are read by direct child lookup (`root/device/friendlyName`), not
//! by searching the whole document.

use crate::error::{DiscoveryError, Result};
use crate::DeviceInfo;
use serde::Deserialize;

/// UPnP device description root element.
#[derive(Debug, Deserialize)]
pub struct Root {
    pub device: DeviceDescription,
}

/// The `device` element of a UPnP description document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    pub device_type: Option<String>,
    pub friendly_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    pub model_number: Option<String>,
    pub serial_number: Option<String>,
}

impl DeviceDescription {
    /// Parse device description from XML.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::ParseError` if the XML is malformed or has no
    /// `device` element under the root.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root: Root = quick_xml::de::from_str(xml)
            .map_err(|e| DiscoveryError::ParseError(format!("Failed to parse device XML: {}", e)))?;

        Ok(root.device)
    }

    /// The subset of fields the dashboard shows
    pub fn to_device_info(&self) -> DeviceInfo {
        DeviceInfo {
            friendly_name: non_empty(&self.friendly_name),
            model: non_empty(&self.model_name),
            manufacturer: non_empty(&self.manufacturer),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
