use crate::{Frame, MsgType, field::Value, schema, schema::Schema};
use uhppote_core::Result;

/// A typed request or reply with a static wire layout.
///
/// Implementations are generated by [`message!`](crate::message!), which
/// declares the struct and its [`Schema`] side by side so the two can never
/// drift apart.
pub trait Message: Sized {
    const MSG_TYPE: MsgType;

    /// The field layout for this message.
    fn schema() -> &'static Schema;

    /// Field values in schema order, literals excluded.
    fn to_values(&self) -> Vec<Value>;

    /// Rebuild the message from values in schema order.
    ///
    /// # Errors
    /// Returns `Error::SchemaMismatch` if a value is missing or of the
    /// wrong kind.
    fn from_values(values: Vec<Value>) -> Result<Self>;

    /// Encode to a 64-byte frame.
    ///
    /// # Errors
    /// Returns an error if a field value has no wire representation.
    fn encode(&self) -> Result<Frame> {
        schema::encode(Self::schema(), &self.to_values())
    }

    /// Decode from a frame that has passed the structural checks.
    ///
    /// # Errors
    /// Returns an error if the message type differs or a field is invalid.
    fn decode(frame: &Frame) -> Result<Self> {
        Self::from_values(schema::decode(Self::schema(), frame)?)
    }
}

/// Declare a message struct together with its wire layout.
///
/// ```
/// use uhppote_core::SerialNumber;
/// use uhppote_protocol::{message, Message, MsgType};
///
/// message! {
///     /// Number of cards stored on a controller.
///     CardCount(MsgType::GetCards) {
///         serial_number: SerialNumber = 4,
///         records: u32 = 8,
///     }
/// }
///
/// let reply = CardCount { serial_number: SerialNumber::new(405419896), records: 3 };
/// let frame = reply.encode().unwrap();
/// assert_eq!(frame.as_bytes()[1], 0x58);
/// assert_eq!(CardCount::decode(&frame).unwrap(), reply);
/// ```
#[macro_export]
macro_rules! message {
    (
        $(#[$meta:meta])*
        $name:ident ($msg_type:expr) {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty = $offset:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl $crate::Message for $name {
            const MSG_TYPE: $crate::MsgType = $msg_type;

            fn schema() -> &'static $crate::schema::Schema {
                static SCHEMA: $crate::schema::Schema = $crate::schema::Schema {
                    name: stringify!($name),
                    msg_type: $msg_type,
                    fields: &[
                        $crate::schema::FieldSpec::literal(
                            "msg_type",
                            $crate::uhppote_core::constants::MSG_TYPE_OFFSET,
                            $msg_type.code(),
                        ),
                        $(
                            $crate::schema::FieldSpec::new(
                                stringify!($field),
                                $offset,
                                <$ty as $crate::field::WireField>::KIND,
                            ),
                        )*
                    ],
                };
                &SCHEMA
            }

            fn to_values(&self) -> Vec<$crate::field::Value> {
                vec![ $( $crate::field::WireField::to_value(&self.$field), )* ]
            }

            #[allow(unused_mut, unused_variables)]
            fn from_values(
                values: Vec<$crate::field::Value>,
            ) -> $crate::uhppote_core::Result<Self> {
                let mut values = values.into_iter();
                Ok($name {
                    $( $field: $crate::field::take(&mut values, stringify!($field))?, )*
                })
            }
        }
    };
}
