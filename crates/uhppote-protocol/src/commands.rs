//! Message type codes for the UT0311-L0x protocol.
//!
//! Byte 1 of every frame selects the field layout used for the rest of the
//! datagram. Requests and their replies share the same code, so a reply is
//! matched to its request by type and serial number.
//!
//! # Message Categories
//!
//! ## Device
//! - `Find` (0x94): Broadcast discovery, answered by every controller
//! - `SetAddress` (0x96): Change IP address, subnet mask and gateway
//! - `GetStatus` (0x20): Door states, last event and system flags.
//!   Also used for unsolicited event pushes to the listener.
//! - `SetTime` (0x30) / `GetTime` (0x32): Controller clock
//! - `OpenDoor` (0x40): Remote door release
//!
//! ## Cards
//! - `PutCard` (0x50), `DeleteCard` (0x52), `DeleteAllCards` (0x54)
//! - `GetCards` (0x58): Number of stored cards
//! - `GetCardById` (0x5a), `GetCardByIndex` (0x5c)
//!
//! ## Doors
//! - `SetDoorControl` (0x80) / `GetDoorControl` (0x82): Control mode and delay
//!
//! ## Events and listener
//! - `SetListener` (0x90) / `GetListener` (0x92)
//! - `GetEvent` (0xb0), `SetEventIndex` (0xb2), `GetEventIndex` (0xb4)
//!
//! # Usage Examples
//!
//! ```
//! use uhppote_protocol::MsgType;
//!
//! let msg_type = MsgType::try_from(0x94).unwrap();
//! assert_eq!(msg_type, MsgType::Find);
//! assert_eq!(msg_type.code(), 0x94);
//! assert_eq!(msg_type.as_str(), "find");
//!
//! // Unknown codes are rejected
//! assert!(MsgType::try_from(0x00).is_err());
//! ```

use std::fmt;
use uhppote_core::{Error, Result};

/// Message type code carried in byte 1 of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MsgType {
    GetStatus = 0x20,
    SetTime = 0x30,
    GetTime = 0x32,
    OpenDoor = 0x40,
    PutCard = 0x50,
    DeleteCard = 0x52,
    DeleteAllCards = 0x54,
    GetCards = 0x58,
    GetCardById = 0x5a,
    GetCardByIndex = 0x5c,
    SetDoorControl = 0x80,
    GetDoorControl = 0x82,
    SetListener = 0x90,
    GetListener = 0x92,
    Find = 0x94,
    SetAddress = 0x96,
    GetEvent = 0xb0,
    SetEventIndex = 0xb2,
    GetEventIndex = 0xb4,
}

impl MsgType {
    /// Every message type, in code order.
    pub const ALL: [MsgType; 19] = [
        MsgType::GetStatus,
        MsgType::SetTime,
        MsgType::GetTime,
        MsgType::OpenDoor,
        MsgType::PutCard,
        MsgType::DeleteCard,
        MsgType::DeleteAllCards,
        MsgType::GetCards,
        MsgType::GetCardById,
        MsgType::GetCardByIndex,
        MsgType::SetDoorControl,
        MsgType::GetDoorControl,
        MsgType::SetListener,
        MsgType::GetListener,
        MsgType::Find,
        MsgType::SetAddress,
        MsgType::GetEvent,
        MsgType::SetEventIndex,
        MsgType::GetEventIndex,
    ];

    /// Get the wire code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Get a short human readable name, used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            MsgType::GetStatus => "get-status",
            MsgType::SetTime => "set-time",
            MsgType::GetTime => "get-time",
            MsgType::OpenDoor => "open-door",
            MsgType::PutCard => "put-card",
            MsgType::DeleteCard => "delete-card",
            MsgType::DeleteAllCards => "delete-all-cards",
            MsgType::GetCards => "get-cards",
            MsgType::GetCardById => "get-card-by-id",
            MsgType::GetCardByIndex => "get-card-by-index",
            MsgType::SetDoorControl => "set-door-control",
            MsgType::GetDoorControl => "get-door-control",
            MsgType::SetListener => "set-listener",
            MsgType::GetListener => "get-listener",
            MsgType::Find => "find",
            MsgType::SetAddress => "set-address",
            MsgType::GetEvent => "get-event",
            MsgType::SetEventIndex => "set-event-index",
            MsgType::GetEventIndex => "get-event-index",
        }
    }

    /// Returns `true` for commands guarded by the magic word.
    pub const fn is_privileged(self) -> bool {
        matches!(
            self,
            MsgType::DeleteAllCards | MsgType::SetAddress | MsgType::SetEventIndex
        )
    }
}

impl TryFrom<u8> for MsgType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        MsgType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(Error::UnknownMessageType(code))
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.as_str(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_codes_roundtrip() {
        for msg_type in MsgType::ALL {
            assert_eq!(MsgType::try_from(msg_type.code()).unwrap(), msg_type);
        }
    }

    #[test]
    fn test_all_codes_unique() {
        let mut codes: Vec<u8> = MsgType::ALL.iter().map(|t| t.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), MsgType::ALL.len());
    }

    #[rstest]
    #[case(0x00)]
    #[case(0x17)]
    #[case(0x19)]
    #[case(0xff)]
    fn test_unknown_codes(#[case] code: u8) {
        assert!(matches!(
            MsgType::try_from(code),
            Err(Error::UnknownMessageType(c)) if c == code
        ));
    }

    #[rstest]
    #[case(MsgType::DeleteAllCards, true)]
    #[case(MsgType::SetAddress, true)]
    #[case(MsgType::SetEventIndex, true)]
    #[case(MsgType::DeleteCard, false)]
    #[case(MsgType::Find, false)]
    fn test_privileged(#[case] msg_type: MsgType, #[case] expected: bool) {
        assert_eq!(msg_type.is_privileged(), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(MsgType::PutCard.to_string(), "put-card (0x50)");
    }
}
