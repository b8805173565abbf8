//! Typed SOAP actions
//!
//! Every device command is a type implementing [`SoapAction`]: it names its
//! service and action, and turns a request value into the XML fragment that
//! goes inside the envelope. Most actions are declared with
//! [`define_action!`](crate::define_action).

pub mod macros;

use crate::service::Service;

/// Instance ID sent with every AVTransport/RenderingControl action
///
/// The receiver is treated as a single zone.
pub const INSTANCE_ID: u32 = 0;

/// A SOAP action understood by the receiver
pub trait SoapAction {
    /// Parameters of the action
    type Request;

    /// The UPnP service this action belongs to
    const SERVICE: Service;

    /// The SOAP action name
    const ACTION: &'static str;

    /// Build the XML fragment placed inside the action element
    fn build_payload(request: &Self::Request) -> String;
}
