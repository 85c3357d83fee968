//! Simulated UHPPOTE UT0311-L0x controllers.
//!
//! A [`Device`] owns the full state of one controller and answers decoded
//! [`Request`](uhppote_protocol::Request)s. It knows nothing about sockets:
//! the transport hands it requests and sends whatever it returns.
//!
//! ```
//! use std::net::SocketAddr;
//! use uhppote_core::{MacAddress, SerialNumber};
//! use uhppote_emulator::{Device, Snapshot};
//! use uhppote_protocol::messages::FindRequest;
//! use uhppote_protocol::{Request, Response};
//!
//! let snapshot = Snapshot::new(SerialNumber::new(405419896), MacAddress::new([0; 6]));
//! let mut device = Device::new(snapshot);
//!
//! let src: SocketAddr = "192.168.1.10:54321".parse().unwrap();
//! let reply = device.handle(&Request::from(FindRequest {}), src);
//! assert!(matches!(reply, Some(Response::Find(_))));
//! ```

pub mod device;
pub mod entities;
pub mod error;
pub mod snapshot;

pub use device::{Device, load_dir};
pub use entities::{Card, CardStore, Door, DoorControl, Event, EventKind, EventLog, Listener};
pub use error::{SnapshotError, SnapshotResult};
pub use snapshot::Snapshot;
