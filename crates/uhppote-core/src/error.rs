use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Frame errors
    #[error("Invalid frame length: expected {expected} bytes, got {actual}")]
    InvalidFrameLength { expected: usize, actual: usize },

    #[error("Invalid preamble: expected 0x{expected:02x}, got 0x{actual:02x}")]
    InvalidPreamble { expected: u8, actual: u8 },

    #[error("Unexpected message type: expected 0x{expected:02x}, got 0x{actual:02x}")]
    UnexpectedMessageType { expected: u8, actual: u8 },

    #[error("Unknown message type: 0x{0:02x}")]
    UnknownMessageType(u8),

    // Field errors
    #[error("Invalid boolean 0x{value:02x} in field '{field}'")]
    InvalidBoolean { field: &'static str, value: u8 },

    #[error("Field '{field}' expected literal 0x{expected:02x}, got 0x{actual:02x}")]
    LiteralMismatch {
        field: &'static str,
        expected: u8,
        actual: u8,
    },

    #[error("Invalid BCD encoding: {0}")]
    InvalidBcd(String),

    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),

    #[error("Invalid MAC address: {0}")]
    InvalidMacAddress(String),

    #[error("Invalid firmware version: {0}")]
    InvalidVersion(String),

    #[error("Invalid serial number: {0}")]
    InvalidSerialNumber(String),

    // Schema errors
    #[error("Invalid schema for message 0x{msg_type:02x}: {reason}")]
    InvalidSchema { msg_type: u8, reason: String },

    #[error("Schema mismatch in field '{field}': {reason}")]
    SchemaMismatch { field: &'static str, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
