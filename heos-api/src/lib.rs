//! Control API for a HEOS/Denon network audio receiver
//!
//! This crate turns the receiver's UPnP SOAP services into a small set of
//! named operations on [`HeosDevice`]. It uses the private `soap-client`
//! crate for envelope construction and HTTP.
//!
//! ```rust,no_run
//! use heos_api::{HeosDevice, StatusRecord};
//!
//! let device = HeosDevice::new("10.20.30.40", 60006);
//! match device.get_status() {
//!     StatusRecord::Status(status) => println!("state: {}", status.transport_state),
//!     StatusRecord::Error { message, .. } => println!("offline: {}", message),
//! }
//! ```

pub mod device;
pub mod endpoint;
pub mod error;
pub mod operation;
pub mod operations;
pub mod service;
pub mod status;
mod xml;

pub use device::{HeosDevice, FALLBACK_VOLUME};
pub use endpoint::DeviceEndpoint;
pub use error::{ApiError, Result};
pub use operation::SoapAction;
pub use service::{Service, ServiceInfo};
pub use status::{StatusRecord, TransportStatus, NOT_AVAILABLE};
