//! Door control mode and unlock delay.
//!
//! Control modes: 1 normally open, 2 normally closed, 3 controlled.

use crate::{MsgType, message};
use uhppote_core::SerialNumber;

message! {
    SetDoorControlRequest(MsgType::SetDoorControl) {
        serial_number: SerialNumber = 4,
        door: u8 = 8,
        control: u8 = 9,
        delay: u8 = 10,
    }
}

message! {
    SetDoorControlResponse(MsgType::SetDoorControl) {
        serial_number: SerialNumber = 4,
        door: u8 = 8,
        control: u8 = 9,
        delay: u8 = 10,
    }
}

message! {
    GetDoorControlRequest(MsgType::GetDoorControl) {
        serial_number: SerialNumber = 4,
        door: u8 = 8,
    }
}

message! {
    GetDoorControlResponse(MsgType::GetDoorControl) {
        serial_number: SerialNumber = 4,
        door: u8 = 8,
        control: u8 = 9,
        delay: u8 = 10,
    }
}
