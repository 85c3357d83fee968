use bytes::Bytes;
use std::fmt;
use uhppote_core::{Error, Result, constants::*};

/// Frame is a single 64-byte controller datagram.
///
/// A Frame is only ever constructed from bytes that have passed the
/// structural checks shared by every message type:
/// - exactly [`FRAME_SIZE`] bytes
/// - byte 0 equals [`PREAMBLE`]
///
/// Anything else is rejected before the message type is even looked at,
/// so a Frame can always be handed to a message decoder.
///
/// # Wire Format
/// ```text
/// 17 5f 7d 00 2d 55 39 19 d2 04 01 00 c0 a8 01 02
/// ^^ ^^       ^^^^^^^^^^^ ^^^^^^^^^^^^^^^^^^^^^^^
/// |  |        serial      message specific fields ...
/// |  message type
/// preamble
/// ```
///
/// # Basic Usage
/// ```
/// use uhppote_protocol::Frame;
///
/// let mut bytes = [0u8; 64];
/// bytes[0] = 0x17;
/// bytes[1] = 0x94;
///
/// let frame = Frame::try_from(&bytes[..]).unwrap();
/// assert_eq!(frame.msg_type(), 0x94);
///
/// // Short or unframed datagrams are rejected
/// assert!(Frame::try_from(&bytes[..63]).is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    data: [u8; FRAME_SIZE],
}

impl Frame {
    /// Create an empty frame stamped with the preamble and a message type.
    pub(crate) fn with_msg_type(msg_type: u8) -> Self {
        let mut data = [0u8; FRAME_SIZE];
        data[0] = PREAMBLE;
        data[MSG_TYPE_OFFSET] = msg_type;
        Frame { data }
    }

    /// Get the message type code (byte 1).
    pub fn msg_type(&self) -> u8 {
        self.data[MSG_TYPE_OFFSET]
    }

    /// Get the raw bytes of the frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8; FRAME_SIZE] {
        &mut self.data
    }

    /// Copy the frame into a `Bytes` buffer for transmission.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data)
    }

    /// Render the frame as a canonical hex dump.
    ///
    /// One line per 16 bytes, prefixed with the offset:
    /// ```text
    /// 00000000  17 94 00 00 78 56 34 12  c0 a8 01 64 ff ff ff 00
    /// ```
    pub fn hex_dump(&self) -> String {
        hex_dump(&self.data)
    }
}

/// Render arbitrary bytes as a canonical hex dump.
///
/// Used for datagrams that never became a [`Frame`].
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(line, chunk)| {
            let (left, right) = chunk.split_at(chunk.len().min(8));
            let spaced = |half: &[u8]| {
                half.iter()
                    .map(|b| hex::encode([*b]))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            format!("{:08x}  {}  {}", line * 16, spaced(left), spaced(right))
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl TryFrom<&[u8]> for Frame {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let data: [u8; FRAME_SIZE] =
            bytes
                .try_into()
                .map_err(|_| Error::InvalidFrameLength {
                    expected: FRAME_SIZE,
                    actual: bytes.len(),
                })?;

        if data[0] != PREAMBLE {
            return Err(Error::InvalidPreamble {
                expected: PREAMBLE,
                actual: data[0],
            });
        }

        Ok(Frame { data })
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("msg_type", &format_args!("0x{:02x}", self.msg_type()))
            .field("data", &hex::encode(self.data))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex_dump())
    }
}
