//! AVTransport service actions

use crate::define_action;

define_action! {
    operation: SetAvTransportUri,
    action: "SetAVTransportURI",
    service: AVTransport,
    request: {
        current_uri: String,
    },
    payload: |req| {
        format!(
            "<InstanceID>{}</InstanceID><CurrentURI>{}</CurrentURI><CurrentURIMetaData></CurrentURIMetaData>",
            req.instance_id,
            html_escape::encode_text(&req.current_uri)
        )
    },
}

define_action! {
    operation: Play,
    action: "Play",
    service: AVTransport,
    request: {
        speed: String,
    },
    payload: |req| format!("<InstanceID>{}</InstanceID><Speed>{}</Speed>", req.instance_id, req.speed),
}

define_action! {
    operation: Pause,
    action: "Pause",
    service: AVTransport,
    request: {},
    payload: |req| format!("<InstanceID>{}</InstanceID>", req.instance_id),
}

define_action! {
    operation: Stop,
    action: "Stop",
    service: AVTransport,
    request: {},
    payload: |req| format!("<InstanceID>{}</InstanceID>", req.instance_id),
}

define_action! {
    operation: GetTransportInfo,
    action: "GetTransportInfo",
    service: AVTransport,
    request: {},
    payload: |req| format!("<InstanceID>{}</InstanceID>", req.instance_id),
}
