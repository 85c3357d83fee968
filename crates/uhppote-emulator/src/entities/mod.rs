//! Per-device state: cards, events, doors and the listener registration.
//!
//! None of these types know about frames or sockets. They are owned by a
//! [`Device`](crate::Device) and serialized as part of its snapshot.

pub mod card;
pub mod door;
pub mod event;
pub mod listener;

pub use card::{Card, CardStore};
pub use door::{Door, DoorControl};
pub use event::{Event, EventKind, EventLog};
pub use listener::Listener;
