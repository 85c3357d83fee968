//! Tokio codec for controller datagrams.
//!
//! `FrameCodec` plugs the 64-byte frame format into
//! [`tokio_util::udp::UdpFramed`]. Every datagram arrives in the read buffer
//! on its own, so the decoder always consumes the whole buffer: a datagram
//! is either one valid [`Frame`] or an error, never a partial read.
//!
//! # Usage with UdpFramed
//!
//! ```rust,no_run
//! use futures::{SinkExt, StreamExt};
//! use tokio::net::UdpSocket;
//! use tokio_util::udp::UdpFramed;
//! use uhppote_protocol::{FrameCodec, Request};
//!
//! # async fn example() -> uhppote_core::Result<()> {
//! let socket = UdpSocket::bind("0.0.0.0:60000").await?;
//! let mut framed = UdpFramed::new(socket, FrameCodec::new());
//!
//! while let Some(received) = framed.next().await {
//!     match received {
//!         Ok((frame, addr)) => println!("{addr}: {:?}", Request::decode(&frame)),
//!         Err(e) => eprintln!("dropped datagram: {e}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Recovery
//!
//! A malformed datagram yields `Err` from the stream. Because the buffer has
//! already been drained, the next poll reads a fresh datagram and the
//! stream keeps running.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::Frame;
use uhppote_core::{Error, Result};

/// Datagram codec for [`Frame`]s.
///
/// With debug dumps enabled every datagram received or sent is logged at
/// `debug` level as a hex dump, including datagrams that fail validation.
#[derive(Debug, Clone, Default)]
pub struct FrameCodec {
    debug: bool,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable hex dumps of every datagram.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if src.is_empty() {
            return Ok(None);
        }

        let datagram = src.split();
        if self.debug {
            debug!(
                len = datagram.len(),
                "received\n{}",
                crate::frame::hex_dump(&datagram)
            );
        }

        Frame::try_from(&datagram[..]).map(Some)
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<()> {
        if self.debug {
            debug!("sent\n{}", frame.hex_dump());
        }
        dst.extend_from_slice(frame.as_bytes());
        Ok(())
    }
}
