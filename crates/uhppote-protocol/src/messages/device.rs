//! Discovery, addressing, status, clock and door release.

use crate::{MsgType, message};
use std::net::Ipv4Addr;
use uhppote_core::{Date, DateTime, MacAddress, SerialNumber, SystemDate, SystemTime, Version};

message! {
    /// Broadcast discovery. Carries no serial number, so every controller
    /// answers it.
    FindRequest(MsgType::Find) {}
}

message! {
    FindResponse(MsgType::Find) {
        serial_number: SerialNumber = 4,
        address: Ipv4Addr = 8,
        subnet: Ipv4Addr = 12,
        gateway: Ipv4Addr = 16,
        mac_address: MacAddress = 20,
        version: Version = 26,
        date: Date = 28,
    }
}

message! {
    /// Change the network identity. Guarded by the magic word and never
    /// answered.
    SetAddressRequest(MsgType::SetAddress) {
        serial_number: SerialNumber = 4,
        address: Ipv4Addr = 8,
        subnet: Ipv4Addr = 12,
        gateway: Ipv4Addr = 16,
        magic_word: u32 = 20,
    }
}

message! {
    GetStatusRequest(MsgType::GetStatus) {
        serial_number: SerialNumber = 4,
    }
}

message! {
    /// Controller status. The same layout is pushed unsolicited to the
    /// registered listener whenever an event is recorded.
    ///
    /// The event fields are zero when the log is empty.
    GetStatusResponse(MsgType::GetStatus) {
        serial_number: SerialNumber = 4,
        last_event_index: u32 = 8,
        event_type: u8 = 12,
        event_granted: bool = 13,
        event_door: u8 = 14,
        event_door_opened: bool = 15,
        event_card_number: u32 = 16,
        event_timestamp: Option<DateTime> = 20,
        event_result: u8 = 27,
        door1_open: bool = 28,
        door2_open: bool = 29,
        door3_open: bool = 30,
        door4_open: bool = 31,
        door1_button: bool = 32,
        door2_button: bool = 33,
        door3_button: bool = 34,
        door4_button: bool = 35,
        system_state: u8 = 36,
        system_time: SystemTime = 37,
        packet_number: u32 = 40,
        backup: u32 = 44,
        special_message: u8 = 48,
        battery: u8 = 49,
        fire_alarm: u8 = 50,
        system_date: SystemDate = 51,
    }
}

message! {
    SetTimeRequest(MsgType::SetTime) {
        serial_number: SerialNumber = 4,
        datetime: DateTime = 8,
    }
}

message! {
    SetTimeResponse(MsgType::SetTime) {
        serial_number: SerialNumber = 4,
        datetime: DateTime = 8,
    }
}

message! {
    GetTimeRequest(MsgType::GetTime) {
        serial_number: SerialNumber = 4,
    }
}

message! {
    GetTimeResponse(MsgType::GetTime) {
        serial_number: SerialNumber = 4,
        datetime: DateTime = 8,
    }
}

message! {
    OpenDoorRequest(MsgType::OpenDoor) {
        serial_number: SerialNumber = 4,
        door: u8 = 8,
    }
}

message! {
    OpenDoorResponse(MsgType::OpenDoor) {
        serial_number: SerialNumber = 4,
        succeeded: bool = 8,
    }
}
