//! Device metadata lookup for a HEOS/Denon receiver
//!
//! This crate does not search the network. Given the address the user
//! configured, it asks the device for its UPnP description document at a
//! few well-known paths and reports the friendly name, model and
//! manufacturer it finds there.
//!
//! # Quick Start
//!
//! ```no_run
//! use heos_discovery::get_device_info;
//!
//! let info = get_device_info("10.20.30.40", 60006);
//! if let Some(name) = info.friendly_name {
//!     println!("Found {}", name);
//! }
//! ```

mod error;
pub mod device;
mod probe;

pub use error::{DiscoveryError, Result};
pub use probe::{check_device_connection, DescriptionProbe, DESCRIPTION_PATHS};

use serde::Serialize;
use std::time::Duration;

/// Default timeout for each probe request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Metadata reported by the device's description document
///
/// Each field is `None` when the document lacked it or no document was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub friendly_name: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
}

impl DeviceInfo {
    /// True when nothing was discovered
    pub fn is_empty(&self) -> bool {
        self.friendly_name.is_none() && self.model.is_none() && self.manufacturer.is_none()
    }
}

/// Look up device metadata with the default 3-second timeout.
///
/// Never fails: when nothing can be learned an empty [`DeviceInfo`] is returned.
pub fn get_device_info(host: &str, port: u16) -> DeviceInfo {
    get_device_info_with_timeout(host, port, DEFAULT_TIMEOUT)
}

/// Look up device metadata with a custom per-request timeout.
pub fn get_device_info_with_timeout(host: &str, port: u16, timeout: Duration) -> DeviceInfo {
    let result = DescriptionProbe::new(timeout).and_then(|probe| probe.probe(host, port));

    match result {
        Ok(description) => description.to_device_info(),
        Err(e) => {
            tracing::warn!(host, port, error = %e, "device discovery failed");
            DeviceInfo::default()
        }
    }
}
