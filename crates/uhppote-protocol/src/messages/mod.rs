//! Typed requests and replies.
//!
//! Every message type is declared once with [`message!`](crate::message!);
//! [`Request`] and [`Response`] are the closed sets the transport decodes
//! into and encodes from.

pub mod cards;
pub mod device;
pub mod doors;
pub mod events;
pub mod listener;

pub use cards::*;
pub use device::*;
pub use doors::*;
pub use events::*;
pub use listener::*;

use crate::{Frame, Message, MsgType, schema::Schema};
use uhppote_core::{Error, Result, SerialNumber};

macro_rules! dispatch {
    (
        $(#[$meta:meta])*
        $name:ident { $( $variant:ident($ty:ident) ),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            $( $variant($ty), )*
        }

        impl $name {
            /// Decode a frame, selecting the layout from its message type.
            ///
            /// # Errors
            /// Returns `Error::UnknownMessageType` if no layout is registered
            /// for byte 1, or a field error if the frame does not decode.
            pub fn decode(frame: &Frame) -> Result<Self> {
                let msg_type = MsgType::try_from(frame.msg_type())?;
                $(
                    if msg_type == <$ty as Message>::MSG_TYPE {
                        return <$ty as Message>::decode(frame).map($name::$variant);
                    }
                )*
                Err(Error::UnknownMessageType(frame.msg_type()))
            }

            /// Encode to a frame.
            ///
            /// # Errors
            /// Returns an error if a field value has no wire representation.
            pub fn encode(&self) -> Result<Frame> {
                match self {
                    $( $name::$variant(m) => m.encode(), )*
                }
            }

            pub fn msg_type(&self) -> MsgType {
                match self {
                    $( $name::$variant(_) => <$ty as Message>::MSG_TYPE, )*
                }
            }

            /// Layouts of every variant.
            pub fn schemas() -> Vec<&'static Schema> {
                vec![ $( <$ty as Message>::schema(), )* ]
            }
        }

        $(
            impl From<$ty> for $name {
                fn from(message: $ty) -> Self {
                    $name::$variant(message)
                }
            }
        )*
    };
}

dispatch! {
    /// Every command a controller accepts.
    Request {
        Find(FindRequest),
        SetAddress(SetAddressRequest),
        GetStatus(GetStatusRequest),
        SetTime(SetTimeRequest),
        GetTime(GetTimeRequest),
        OpenDoor(OpenDoorRequest),
        PutCard(PutCardRequest),
        DeleteCard(DeleteCardRequest),
        DeleteAllCards(DeleteAllCardsRequest),
        GetCards(GetCardsRequest),
        GetCardById(GetCardByIdRequest),
        GetCardByIndex(GetCardByIndexRequest),
        SetDoorControl(SetDoorControlRequest),
        GetDoorControl(GetDoorControlRequest),
        SetListener(SetListenerRequest),
        GetListener(GetListenerRequest),
        GetEvent(GetEventRequest),
        SetEventIndex(SetEventIndexRequest),
        GetEventIndex(GetEventIndexRequest),
    }
}

dispatch! {
    /// Every reply a controller sends. Set address has none.
    Response {
        Find(FindResponse),
        GetStatus(GetStatusResponse),
        SetTime(SetTimeResponse),
        GetTime(GetTimeResponse),
        OpenDoor(OpenDoorResponse),
        PutCard(PutCardResponse),
        DeleteCard(DeleteCardResponse),
        DeleteAllCards(DeleteAllCardsResponse),
        GetCards(GetCardsResponse),
        GetCardById(GetCardByIdResponse),
        GetCardByIndex(GetCardByIndexResponse),
        SetDoorControl(SetDoorControlResponse),
        GetDoorControl(GetDoorControlResponse),
        SetListener(SetListenerResponse),
        GetListener(GetListenerResponse),
        GetEvent(GetEventResponse),
        SetEventIndex(SetEventIndexResponse),
        GetEventIndex(GetEventIndexResponse),
    }
}

impl Request {
    /// The controller this request is addressed to.
    ///
    /// `None` for discovery, which every controller answers.
    pub fn serial_number(&self) -> Option<SerialNumber> {
        let serial = match self {
            Request::Find(_) => return None,
            Request::SetAddress(m) => m.serial_number,
            Request::GetStatus(m) => m.serial_number,
            Request::SetTime(m) => m.serial_number,
            Request::GetTime(m) => m.serial_number,
            Request::OpenDoor(m) => m.serial_number,
            Request::PutCard(m) => m.serial_number,
            Request::DeleteCard(m) => m.serial_number,
            Request::DeleteAllCards(m) => m.serial_number,
            Request::GetCards(m) => m.serial_number,
            Request::GetCardById(m) => m.serial_number,
            Request::GetCardByIndex(m) => m.serial_number,
            Request::SetDoorControl(m) => m.serial_number,
            Request::GetDoorControl(m) => m.serial_number,
            Request::SetListener(m) => m.serial_number,
            Request::GetListener(m) => m.serial_number,
            Request::GetEvent(m) => m.serial_number,
            Request::SetEventIndex(m) => m.serial_number,
            Request::GetEventIndex(m) => m.serial_number,
        };
        Some(serial)
    }

    /// Authorization field of a privileged command.
    ///
    /// `Some` exactly for the message types where
    /// [`MsgType::is_privileged`] holds.
    pub fn magic_word(&self) -> Option<u32> {
        match self {
            Request::SetAddress(m) => Some(m.magic_word),
            Request::DeleteAllCards(m) => Some(m.magic_word),
            Request::SetEventIndex(m) => Some(m.magic_word),
            _ => None,
        }
    }
}

/// Every layout known to the codec, requests first.
pub fn all_schemas() -> Vec<&'static Schema> {
    let mut schemas = Request::schemas();
    schemas.extend(Response::schemas());
    schemas
}

/// Validate every registered layout.
///
/// Called once before the transport binds its socket.
///
/// # Errors
/// Returns the first `Error::InvalidSchema` found.
pub fn validate_all() -> Result<()> {
    all_schemas()
        .into_iter()
        .try_for_each(crate::validation::validate_schema)
}
