pub mod codec;
pub mod commands;
pub mod field;
pub mod frame;
pub mod message;
pub mod messages;
pub mod schema;
pub mod validation;

pub use codec::FrameCodec;
pub use commands::MsgType;
pub use field::{FieldKind, Value, WireField};
pub use frame::{Frame, hex_dump};
pub use message::Message;
pub use messages::{Request, Response, all_schemas, validate_all};
pub use validation::validate_schema;

#[doc(hidden)]
pub use uhppote_core;
