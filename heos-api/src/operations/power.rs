//! Denon ACT power action

use serde::Serialize;

use crate::operation::SoapAction;
use crate::service::Service;

/// Power state value that switches the receiver to standby
pub const POWER_OFF: &str = "Off";

/// PutPowerState action
///
/// Unlike the UPnP AV actions this one carries no instance ID.
pub struct PutPowerState;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PutPowerStateRequest {
    pub power: String,
}

impl SoapAction for PutPowerState {
    type Request = PutPowerStateRequest;

    const SERVICE: Service = Service::Act;
    const ACTION: &'static str = "PutPowerState";

    fn build_payload(request: &Self::Request) -> String {
        format!("<Power>{}</Power>", request.power)
    }
}

pub fn power_off() -> PutPowerStateRequest {
    PutPowerStateRequest {
        power: POWER_OFF.to_string(),
    }
}
