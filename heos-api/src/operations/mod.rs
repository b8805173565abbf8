//! The actions the dashboard sends to the receiver

pub mod av_transport;
pub mod power;
pub mod rendering_control;
