//! Semantic field types and their byte-level encoding rules.
//!
//! Every field in a message schema carries a [`FieldKind`] that fixes its
//! width and how it is written to and read from a frame. Typed messages
//! exchange data with the generic codec through [`Value`], and the
//! [`WireField`] trait ties each Rust type to exactly one kind, so a field
//! whose type has no encoding rule does not compile.
//!
//! | Kind | Width | Encoding |
//! |------|-------|----------|
//! | `Literal` | 1 | fixed byte, verified on decode |
//! | `Byte` | 1 | raw byte |
//! | `Bool` | 1 | `0x00` or `0x01`, anything else is an error |
//! | `Uint16` | 2 | little-endian |
//! | `Uint32` | 4 | little-endian |
//! | `Ipv4` | 4 | network order octets |
//! | `Mac` | 6 | raw octets |
//! | `SerialNumber` | 4 | little-endian |
//! | `Version` | 2 | big-endian |
//! | `Date` / `OptionalDate` | 4 | BCD `YYYYMMDD` (all zero = absent) |
//! | `DateTime` / `OptionalDateTime` | 7 | BCD `YYYYMMDDHHMMSS` (all zero = absent) |
//! | `SystemDate` | 3 | BCD `YYMMDD` |
//! | `SystemTime` | 3 | BCD `HHMMSS` |

use std::net::Ipv4Addr;
use uhppote_core::{
    Date, DateTime, Error, MacAddress, Result, SerialNumber, SystemDate, SystemTime, Version,
};

/// Semantic type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Literal(u8),
    Byte,
    Bool,
    Uint16,
    Uint32,
    Ipv4,
    Mac,
    SerialNumber,
    Version,
    Date,
    OptionalDate,
    DateTime,
    OptionalDateTime,
    SystemDate,
    SystemTime,
}

impl FieldKind {
    /// Number of frame bytes occupied by a field of this kind.
    pub const fn width(self) -> usize {
        match self {
            FieldKind::Literal(_) | FieldKind::Byte | FieldKind::Bool => 1,
            FieldKind::Uint16 | FieldKind::Version => 2,
            FieldKind::SystemDate | FieldKind::SystemTime => 3,
            FieldKind::Uint32 | FieldKind::Ipv4 | FieldKind::SerialNumber => 4,
            FieldKind::Date | FieldKind::OptionalDate => 4,
            FieldKind::Mac => 6,
            FieldKind::DateTime | FieldKind::OptionalDateTime => 7,
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Byte(u8),
    Bool(bool),
    Uint16(u16),
    Uint32(u32),
    Ipv4(Ipv4Addr),
    Mac(MacAddress),
    SerialNumber(SerialNumber),
    Version(Version),
    Date(Date),
    OptionalDate(Option<Date>),
    DateTime(DateTime),
    OptionalDateTime(Option<DateTime>),
    SystemDate(SystemDate),
    SystemTime(SystemTime),
}

impl Value {
    /// The field kind this value encodes as.
    pub const fn kind(&self) -> FieldKind {
        match self {
            Value::Byte(_) => FieldKind::Byte,
            Value::Bool(_) => FieldKind::Bool,
            Value::Uint16(_) => FieldKind::Uint16,
            Value::Uint32(_) => FieldKind::Uint32,
            Value::Ipv4(_) => FieldKind::Ipv4,
            Value::Mac(_) => FieldKind::Mac,
            Value::SerialNumber(_) => FieldKind::SerialNumber,
            Value::Version(_) => FieldKind::Version,
            Value::Date(_) => FieldKind::Date,
            Value::OptionalDate(_) => FieldKind::OptionalDate,
            Value::DateTime(_) => FieldKind::DateTime,
            Value::OptionalDateTime(_) => FieldKind::OptionalDateTime,
            Value::SystemDate(_) => FieldKind::SystemDate,
            Value::SystemTime(_) => FieldKind::SystemTime,
        }
    }

    /// Write the value into `buf`, which is exactly `kind().width()` bytes.
    pub(crate) fn write(&self, buf: &mut [u8]) -> Result<()> {
        match self {
            Value::Byte(v) => buf[0] = *v,
            Value::Bool(v) => buf[0] = u8::from(*v),
            Value::Uint16(v) => buf.copy_from_slice(&v.to_le_bytes()),
            Value::Uint32(v) => buf.copy_from_slice(&v.to_le_bytes()),
            Value::Ipv4(v) => buf.copy_from_slice(&v.octets()),
            Value::Mac(v) => buf.copy_from_slice(&v.octets()),
            Value::SerialNumber(v) => buf.copy_from_slice(&v.as_u32().to_le_bytes()),
            Value::Version(v) => buf.copy_from_slice(&v.as_u16().to_be_bytes()),
            Value::Date(v) => buf.copy_from_slice(&v.to_bcd()?),
            Value::OptionalDate(v) => match v {
                Some(date) => buf.copy_from_slice(&date.to_bcd()?),
                None => buf.fill(0),
            },
            Value::DateTime(v) => buf.copy_from_slice(&v.to_bcd()?),
            Value::OptionalDateTime(v) => match v {
                Some(datetime) => buf.copy_from_slice(&datetime.to_bcd()?),
                None => buf.fill(0),
            },
            Value::SystemDate(v) => buf.copy_from_slice(&v.to_bcd()?),
            Value::SystemTime(v) => buf.copy_from_slice(&v.to_bcd()?),
        }
        Ok(())
    }

    /// Read a value of `kind` from `buf`, which is exactly `kind.width()` bytes.
    ///
    /// Literal fields carry no value and are handled by the caller.
    pub(crate) fn read(kind: FieldKind, name: &'static str, buf: &[u8]) -> Result<Value> {
        let value = match kind {
            FieldKind::Literal(_) => {
                return Err(Error::SchemaMismatch {
                    field: name,
                    reason: "literal fields have no value".to_string(),
                });
            }
            FieldKind::Byte => Value::Byte(buf[0]),
            FieldKind::Bool => match buf[0] {
                0x00 => Value::Bool(false),
                0x01 => Value::Bool(true),
                other => {
                    return Err(Error::InvalidBoolean {
                        field: name,
                        value: other,
                    });
                }
            },
            FieldKind::Uint16 => Value::Uint16(u16::from_le_bytes(array(buf))),
            FieldKind::Uint32 => Value::Uint32(u32::from_le_bytes(array(buf))),
            FieldKind::Ipv4 => Value::Ipv4(Ipv4Addr::from(array::<4>(buf))),
            FieldKind::Mac => Value::Mac(MacAddress::new(array(buf))),
            FieldKind::SerialNumber => {
                Value::SerialNumber(SerialNumber::new(u32::from_le_bytes(array(buf))))
            }
            FieldKind::Version => Value::Version(Version::new(u16::from_be_bytes(array(buf)))),
            FieldKind::Date => Value::Date(Date::from_bcd(&array(buf))?),
            FieldKind::OptionalDate => Value::OptionalDate(if is_zero(buf) {
                None
            } else {
                Some(Date::from_bcd(&array(buf))?)
            }),
            FieldKind::DateTime => Value::DateTime(DateTime::from_bcd(&array(buf))?),
            FieldKind::OptionalDateTime => Value::OptionalDateTime(if is_zero(buf) {
                None
            } else {
                Some(DateTime::from_bcd(&array(buf))?)
            }),
            FieldKind::SystemDate => Value::SystemDate(SystemDate::from_bcd(&array(buf))?),
            FieldKind::SystemTime => Value::SystemTime(SystemTime::from_bcd(&array(buf))?),
        };

        Ok(value)
    }
}

/// Copy a field slice into a fixed-size array.
///
/// Field slices are cut to `FieldKind::width()` by the codec, so the length
/// always matches; a mismatch would leave the tail zeroed.
fn array<const N: usize>(buf: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let n = N.min(buf.len());
    out[..n].copy_from_slice(&buf[..n]);
    out
}

fn is_zero(buf: &[u8]) -> bool {
    buf.iter().all(|b| *b == 0)
}

/// Binds a Rust type to the field kind used to carry it on the wire.
pub trait WireField: Sized {
    const KIND: FieldKind;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! wire_field {
    ($ty:ty, $kind:ident) => {
        impl WireField for $ty {
            const KIND: FieldKind = FieldKind::$kind;

            fn to_value(&self) -> Value {
                Value::$kind(*self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$kind(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

wire_field!(u8, Byte);
wire_field!(bool, Bool);
wire_field!(u16, Uint16);
wire_field!(u32, Uint32);
wire_field!(Ipv4Addr, Ipv4);
wire_field!(MacAddress, Mac);
wire_field!(SerialNumber, SerialNumber);
wire_field!(Version, Version);
wire_field!(Date, Date);
wire_field!(Option<Date>, OptionalDate);
wire_field!(DateTime, DateTime);
wire_field!(Option<DateTime>, OptionalDateTime);
wire_field!(SystemDate, SystemDate);
wire_field!(SystemTime, SystemTime);

/// Pull the next value off a decoded field list and convert it.
///
/// # Errors
/// Returns `Error::SchemaMismatch` if the list is exhausted or the value
/// has a different kind than `T` expects.
pub fn take<T: WireField>(
    values: &mut impl Iterator<Item = Value>,
    field: &'static str,
) -> Result<T> {
    let value = values.next().ok_or_else(|| Error::SchemaMismatch {
        field,
        reason: "missing value".to_string(),
    })?;

    T::from_value(value).ok_or_else(|| Error::SchemaMismatch {
        field,
        reason: format!("expected {:?}, got {:?}", T::KIND, value.kind()),
    })
}
