//! RenderingControl service actions

use crate::define_action;

/// Channel addressed by the volume actions
pub const MASTER_CHANNEL: &str = "Master";

define_action! {
    operation: GetVolume,
    action: "GetVolume",
    service: RenderingControl,
    request: {
        channel: String,
    },
    payload: |req| format!("<InstanceID>{}</InstanceID><Channel>{}</Channel>", req.instance_id, req.channel),
}

define_action! {
    operation: SetVolume,
    action: "SetVolume",
    service: RenderingControl,
    request: {
        channel: String,
        desired_volume: String,
    },
    payload: |req| {
        format!(
            "<InstanceID>{}</InstanceID><Channel>{}</Channel><DesiredVolume>{}</DesiredVolume>",
            req.instance_id,
            req.channel,
            html_escape::encode_text(&req.desired_volume)
        )
    },
}
