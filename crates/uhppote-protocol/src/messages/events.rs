//! Event log retrieval and the acknowledgment pointer.

use crate::{MsgType, message};
use uhppote_core::{DateTime, SerialNumber};

message! {
    GetEventRequest(MsgType::GetEvent) {
        serial_number: SerialNumber = 4,
        index: u32 = 8,
    }
}

message! {
    GetEventResponse(MsgType::GetEvent) {
        serial_number: SerialNumber = 4,
        index: u32 = 8,
        event_type: u8 = 12,
        granted: bool = 13,
        door: u8 = 14,
        door_opened: bool = 15,
        card_number: u32 = 16,
        timestamp: DateTime = 20,
        result: u8 = 27,
    }
}

message! {
    /// Move the acknowledgment pointer. Guarded by the magic word.
    SetEventIndexRequest(MsgType::SetEventIndex) {
        serial_number: SerialNumber = 4,
        index: u32 = 8,
        magic_word: u32 = 12,
    }
}

message! {
    SetEventIndexResponse(MsgType::SetEventIndex) {
        serial_number: SerialNumber = 4,
        changed: bool = 8,
    }
}

message! {
    GetEventIndexRequest(MsgType::GetEventIndex) {
        serial_number: SerialNumber = 4,
    }
}

message! {
    GetEventIndexResponse(MsgType::GetEventIndex) {
        serial_number: SerialNumber = 4,
        index: u32 = 8,
    }
}
