//! Event listener registration.

use crate::{MsgType, message};
use std::net::Ipv4Addr;
use uhppote_core::SerialNumber;

message! {
    SetListenerRequest(MsgType::SetListener) {
        serial_number: SerialNumber = 4,
        address: Ipv4Addr = 8,
        port: u16 = 12,
    }
}

message! {
    SetListenerResponse(MsgType::SetListener) {
        serial_number: SerialNumber = 4,
        succeeded: bool = 8,
    }
}

message! {
    GetListenerRequest(MsgType::GetListener) {
        serial_number: SerialNumber = 4,
    }
}

message! {
    /// `0.0.0.0:0` when no listener is registered.
    GetListenerResponse(MsgType::GetListener) {
        serial_number: SerialNumber = 4,
        address: Ipv4Addr = 8,
        port: u16 = 12,
    }
}
