//! Card store commands.
//!
//! Door permissions travel as one boolean byte per door at offsets 20..=23.

use crate::{MsgType, message};
use uhppote_core::{Date, SerialNumber};

message! {
    PutCardRequest(MsgType::PutCard) {
        serial_number: SerialNumber = 4,
        card_number: u32 = 8,
        from: Date = 12,
        to: Date = 16,
        door1: bool = 20,
        door2: bool = 21,
        door3: bool = 22,
        door4: bool = 23,
    }
}

message! {
    PutCardResponse(MsgType::PutCard) {
        serial_number: SerialNumber = 4,
        succeeded: bool = 8,
    }
}

message! {
    DeleteCardRequest(MsgType::DeleteCard) {
        serial_number: SerialNumber = 4,
        card_number: u32 = 8,
    }
}

message! {
    DeleteCardResponse(MsgType::DeleteCard) {
        serial_number: SerialNumber = 4,
        succeeded: bool = 8,
    }
}

message! {
    DeleteAllCardsRequest(MsgType::DeleteAllCards) {
        serial_number: SerialNumber = 4,
        magic_word: u32 = 8,
    }
}

message! {
    DeleteAllCardsResponse(MsgType::DeleteAllCards) {
        serial_number: SerialNumber = 4,
        succeeded: bool = 8,
    }
}

message! {
    GetCardsRequest(MsgType::GetCards) {
        serial_number: SerialNumber = 4,
    }
}

message! {
    GetCardsResponse(MsgType::GetCards) {
        serial_number: SerialNumber = 4,
        records: u32 = 8,
    }
}

message! {
    GetCardByIdRequest(MsgType::GetCardById) {
        serial_number: SerialNumber = 4,
        card_number: u32 = 8,
    }
}

message! {
    /// A card record, or all zeroes when the card is not stored.
    GetCardByIdResponse(MsgType::GetCardById) {
        serial_number: SerialNumber = 4,
        card_number: u32 = 8,
        from: Option<Date> = 12,
        to: Option<Date> = 16,
        door1: bool = 20,
        door2: bool = 21,
        door3: bool = 22,
        door4: bool = 23,
    }
}

message! {
    /// Look up a card by its 1-based position in the store.
    GetCardByIndexRequest(MsgType::GetCardByIndex) {
        serial_number: SerialNumber = 4,
        index: u32 = 8,
    }
}

message! {
    GetCardByIndexResponse(MsgType::GetCardByIndex) {
        serial_number: SerialNumber = 4,
        card_number: u32 = 8,
        from: Option<Date> = 12,
        to: Option<Date> = 16,
        door1: bool = 20,
        door2: bool = 21,
        door3: bool = 22,
        door4: bool = 23,
    }
}
