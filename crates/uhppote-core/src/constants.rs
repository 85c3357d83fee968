//! Core constants for the UT0311-L0x controller protocol.
//!
//! This module defines the protocol-level constants shared by the codec,
//! the device emulator and the UDP transport. Every request and reply
//! exchanged with a controller is a single fixed-size UDP datagram.
//!
//! # Frame Structure
//!
//! ```text
//!  0      1      2..3    4..7            8..63
//! +------+------+-------+---------------+--------------------------+
//! | 0x17 | type | 0x00  | serial number | message specific fields  |
//! +------+------+-------+---------------+--------------------------+
//! ```
//!
//! Where:
//! - `0x17` - Preamble, identifies a controller frame
//! - `type` - Message type code, selects the field layout
//! - `serial number` - Little-endian controller serial number
//!   (absent from the discovery request)
//! - Unused bytes are always zero
//!
//! # Usage
//!
//! ```
//! use uhppote_core::constants::*;
//!
//! fn looks_like_a_frame(bytes: &[u8]) -> bool {
//!     bytes.len() == FRAME_SIZE && bytes[0] == PREAMBLE
//! }
//!
//! let mut frame = [0u8; FRAME_SIZE];
//! frame[0] = PREAMBLE;
//! assert!(looks_like_a_frame(&frame));
//! ```
//!
//! # Protocol Compliance
//!
//! These values are fixed by the controller firmware. Client software
//! relies on them byte for byte, so changing any of them breaks
//! interoperability with real host applications.

// ============================================================================
// Message Framing
// ============================================================================

/// Size of every request and reply frame, in bytes.
pub const FRAME_SIZE: usize = 64;

/// First byte of every valid frame.
pub const PREAMBLE: u8 = 0x17;

/// Offset of the message type code within a frame.
pub const MSG_TYPE_OFFSET: usize = 1;

// ============================================================================
// Authorization
// ============================================================================

/// Magic word required by destructive commands.
///
/// Delete-all-cards, set-address and set-event-index carry this constant
/// in a dedicated 32-bit field. Requests with any other value are ignored.
pub const MAGIC_WORD: u32 = 0x55aa_aa55;

// ============================================================================
// Network Defaults
// ============================================================================

/// UDP port controllers listen on.
pub const DEFAULT_UDP_PORT: u16 = 60000;

/// Default bind address for the simulator.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:60000";

// ============================================================================
// Device Defaults
// ============================================================================

/// Number of doors on a UT0311-L04 controller.
pub const DOOR_COUNT: u8 = 4;

/// Default door open delay, in seconds.
pub const DEFAULT_DOOR_DELAY: u8 = 5;

/// Default firmware version reported by simulated controllers.
pub const DEFAULT_FIRMWARE_VERSION: u16 = 0x0892;
