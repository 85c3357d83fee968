//! Declarative message layouts and the generic frame codec.
//!
//! A [`Schema`] lists every field of one message type as
//! `(name, offset, kind)`. The message type code itself is the first field,
//! a [`FieldKind::Literal`] at offset 1, so the same table both stamps
//! outgoing frames and rejects incoming frames of the wrong type.
//!
//! [`encode`] and [`decode`] are the only places that touch frame bytes;
//! typed messages only convert themselves to and from a list of [`Value`]s
//! in schema order (literals excluded).
//!
//! ```text
//! PutCardRequest
//!   msg_type     @1   Literal(0x50)
//!   serial_number@4   SerialNumber
//!   card_number  @8   Uint32
//!   from         @12  Date
//!   ...
//! ```

use crate::{Frame, MsgType, field::FieldKind, field::Value};
use uhppote_core::{Error, Result, constants::MSG_TYPE_OFFSET};

/// One entry in a message layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, offset: usize, kind: FieldKind) -> Self {
        FieldSpec { name, offset, kind }
    }

    /// A fixed byte, written on encode and verified on decode.
    pub const fn literal(name: &'static str, offset: usize, value: u8) -> Self {
        FieldSpec {
            name,
            offset,
            kind: FieldKind::Literal(value),
        }
    }

    /// Byte range occupied by the field.
    pub const fn end(&self) -> usize {
        self.offset + self.kind.width()
    }
}

/// Complete layout of one request or reply.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub msg_type: MsgType,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Fields that carry a value, in declaration order.
    pub fn value_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| !matches!(f.kind, FieldKind::Literal(_)))
    }
}

/// Encode `values` into a frame laid out by `schema`.
///
/// # Errors
/// Returns `Error::SchemaMismatch` if the number or kinds of `values` do
/// not match the schema, or a field error if a value cannot be encoded
/// (a date outside the BCD range, for instance).
pub fn encode(schema: &Schema, values: &[Value]) -> Result<Frame> {
    let mut frame = Frame::with_msg_type(schema.msg_type.code());
    let mut values = values.iter();

    {
        let buf = frame.as_bytes_mut();
        for field in schema.fields {
            let slot = buf
                .get_mut(field.offset..field.end())
                .ok_or_else(|| out_of_bounds(schema, field))?;

            if let FieldKind::Literal(byte) = field.kind {
                slot[0] = byte;
                continue;
            }

            let value = values.next().ok_or_else(|| Error::SchemaMismatch {
                field: field.name,
                reason: "missing value".to_string(),
            })?;

            if value.kind() != field.kind {
                return Err(Error::SchemaMismatch {
                    field: field.name,
                    reason: format!("expected {:?}, got {:?}", field.kind, value.kind()),
                });
            }

            value.write(slot)?;
        }
    }

    if values.next().is_some() {
        return Err(Error::SchemaMismatch {
            field: schema.name,
            reason: "more values than fields".to_string(),
        });
    }

    Ok(frame)
}

/// Decode the value fields of `frame` according to `schema`.
///
/// The frame has already passed the length and preamble checks. The
/// message type literal is verified first so that a frame is never
/// decoded with another message's layout.
///
/// # Errors
/// - `Error::UnexpectedMessageType` if byte 1 differs from the schema
/// - `Error::LiteralMismatch` for any other literal field
/// - field errors for invalid booleans or BCD values
pub fn decode(schema: &Schema, frame: &Frame) -> Result<Vec<Value>> {
    let bytes = frame.as_bytes();

    if frame.msg_type() != schema.msg_type.code() {
        return Err(Error::UnexpectedMessageType {
            expected: schema.msg_type.code(),
            actual: frame.msg_type(),
        });
    }

    let mut values = Vec::with_capacity(schema.value_fields().count());
    for field in schema.fields {
        let slot = bytes
            .get(field.offset..field.end())
            .ok_or_else(|| out_of_bounds(schema, field))?;

        match field.kind {
            FieldKind::Literal(expected) if slot[0] != expected => {
                return Err(if field.offset == MSG_TYPE_OFFSET {
                    Error::UnexpectedMessageType {
                        expected,
                        actual: slot[0],
                    }
                } else {
                    Error::LiteralMismatch {
                        field: field.name,
                        expected,
                        actual: slot[0],
                    }
                });
            }
            FieldKind::Literal(_) => {}
            kind => values.push(Value::read(kind, field.name, slot)?),
        }
    }

    Ok(values)
}

fn out_of_bounds(schema: &Schema, field: &FieldSpec) -> Error {
    Error::InvalidSchema {
        msg_type: schema.msg_type.code(),
        reason: format!("field '{}' ends past the frame at {}", field.name, field.end()),
    }
}
