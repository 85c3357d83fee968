//! Schema validation, run once when the message registry is built.
//!
//! Layout mistakes in a [`Schema`] are authoring bugs, not protocol input
//! problems: an overlapping field or one that runs past the end of the
//! frame would corrupt every message of that type. They are caught here,
//! before the transport starts listening, instead of per datagram.
//!
//! # Rules
//!
//! - the first field is the message type literal at offset 1 and matches
//!   the schema's [`MsgType`](crate::MsgType)
//! - no field touches the preamble byte
//! - every field lies within the 64-byte frame
//! - fields do not overlap
//! - field names are unique
//!
//! # Examples
//!
//! ```
//! use uhppote_protocol::{validate_schema, all_schemas};
//!
//! for schema in all_schemas() {
//!     assert!(validate_schema(schema).is_ok());
//! }
//! ```

use crate::{
    field::FieldKind,
    schema::{FieldSpec, Schema},
};
use std::collections::HashSet;
use uhppote_core::{Error, Result, constants::*};

/// Validate a message layout.
///
/// # Errors
/// Returns `Error::InvalidSchema` describing the first rule violated.
pub fn validate_schema(schema: &Schema) -> Result<()> {
    let invalid = |reason: String| Error::InvalidSchema {
        msg_type: schema.msg_type.code(),
        reason: format!("{}: {reason}", schema.name),
    };

    match schema.fields.first() {
        Some(FieldSpec {
            offset: MSG_TYPE_OFFSET,
            kind: FieldKind::Literal(code),
            ..
        }) if *code == schema.msg_type.code() => {}
        _ => {
            return Err(invalid(format!(
                "first field must be the 0x{:02x} literal at offset {MSG_TYPE_OFFSET}",
                schema.msg_type.code()
            )));
        }
    }

    let mut names = HashSet::new();
    for field in schema.fields {
        if !names.insert(field.name) {
            return Err(invalid(format!("duplicate field '{}'", field.name)));
        }
        if field.offset == 0 {
            return Err(invalid(format!("field '{}' overlaps the preamble", field.name)));
        }
        if field.end() > FRAME_SIZE {
            return Err(invalid(format!(
                "field '{}' ends at {} past the {FRAME_SIZE} byte frame",
                field.name,
                field.end()
            )));
        }
    }

    let mut sorted: Vec<&FieldSpec> = schema.fields.iter().collect();
    sorted.sort_by_key(|f| f.offset);
    for pair in sorted.windows(2) {
        if pair[0].end() > pair[1].offset {
            return Err(invalid(format!(
                "fields '{}' and '{}' overlap",
                pair[0].name, pair[1].name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MsgType;
    use rstest::rstest;

    const MSG: FieldSpec = FieldSpec::literal("msg_type", 1, 0x58);
    const SERIAL: FieldSpec = FieldSpec::new("serial_number", 4, FieldKind::SerialNumber);
    const WRONG_MSG: FieldSpec = FieldSpec::literal("msg_type", 1, 0x5a);
    const OVERLAPPING: FieldSpec = FieldSpec::new("records", 6, FieldKind::Uint32);
    const PAST_END: FieldSpec = FieldSpec::new("last", 61, FieldKind::Uint32);
    const ON_PREAMBLE: FieldSpec = FieldSpec::new("start", 0, FieldKind::Byte);
    const DUPLICATE: FieldSpec = FieldSpec::new("serial_number", 8, FieldKind::Uint32);

    fn schema(fields: &'static [FieldSpec]) -> Schema {
        Schema {
            name: "TestMessage",
            msg_type: MsgType::GetCards,
            fields,
        }
    }

    #[test]
    fn test_valid_schema() {
        static FIELDS: [FieldSpec; 3] = [
            MSG,
            SERIAL,
            FieldSpec::new("records", 8, FieldKind::Uint32),
        ];
        assert!(validate_schema(&schema(&FIELDS)).is_ok());
    }

    #[test]
    fn test_field_may_end_at_frame_boundary() {
        static FIELDS: [FieldSpec; 2] = [MSG, FieldSpec::new("last", 60, FieldKind::Uint32)];
        assert!(validate_schema(&schema(&FIELDS)).is_ok());
    }

    #[rstest]
    #[case::missing_literal(&[SERIAL])]
    #[case::wrong_literal(&[WRONG_MSG, SERIAL])]
    #[case::literal_not_first(&[SERIAL, MSG])]
    #[case::overlap(&[MSG, SERIAL, OVERLAPPING])]
    #[case::past_end(&[MSG, PAST_END])]
    #[case::preamble(&[MSG, ON_PREAMBLE])]
    #[case::duplicate(&[MSG, SERIAL, DUPLICATE])]
    fn test_invalid_schema(#[case] fields: &'static [FieldSpec]) {
        assert!(matches!(
            validate_schema(&schema(fields)),
            Err(Error::InvalidSchema { msg_type: 0x58, .. })
        ));
    }
}
