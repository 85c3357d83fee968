//! Shared helpers for the protocol integration tests.

#![allow(dead_code)]

use uhppote_protocol::Frame;

/// Controller used throughout the captured frames below.
pub const SERIAL_NUMBER: u32 = 423187757;

/// Parse a whitespace separated hex string into a frame.
pub fn frame(hex_bytes: &str) -> Frame {
    let compact: String = hex_bytes.split_whitespace().collect();
    let bytes = hex::decode(compact).expect("valid hex");
    Frame::try_from(&bytes[..]).expect("valid frame")
}

/// Frame bytes as compact lowercase hex, for readable assertion diffs.
pub fn hex_of(frame: &Frame) -> String {
    hex::encode(frame.as_bytes())
}
