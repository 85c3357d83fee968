//! Append-only event log.
//!
//! Events are addressed by a 1-based index that only grows. The
//! acknowledgment pointer (`index`) is independent of the log length: a
//! host moves it to record how far it has read, and it may point past the
//! last event.

use serde::{Deserialize, Serialize};
use uhppote_core::DateTime;

/// Card number reported for remotely opened doors.
pub const REMOTE_OPEN_CARD: u32 = 3922570474;

/// The kinds of event a simulated controller records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SwipeGranted,
    SwipeDenied,
    RemoteOpen,
}

impl EventKind {
    /// Event type byte.
    pub const fn event_type(self) -> u8 {
        match self {
            EventKind::SwipeGranted | EventKind::RemoteOpen => 0x02,
            EventKind::SwipeDenied => 0x01,
        }
    }

    /// Result (reason) byte.
    pub const fn result(self) -> u8 {
        match self {
            EventKind::SwipeGranted => 0x01,
            EventKind::SwipeDenied => 0x06,
            EventKind::RemoteOpen => 0x2c,
        }
    }

    pub const fn granted(self) -> bool {
        !matches!(self, EventKind::SwipeDenied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: u8,
    pub granted: bool,
    pub door: u8,
    pub door_opened: bool,
    pub card: u32,
    pub timestamp: DateTime,
    pub result: u8,
}

impl Event {
    pub fn new(kind: EventKind, door: u8, door_opened: bool, card: u32, timestamp: DateTime) -> Self {
        Event {
            event_type: kind.event_type(),
            granted: kind.granted(),
            door,
            door_opened,
            card,
            timestamp,
            result: kind.result(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its index.
    pub fn add(&mut self, event: Event) -> u32 {
        self.events.push(event);
        self.last_index()
    }

    /// Event at a 1-based index. `None` for 0 or past the end.
    pub fn get(&self, index: u32) -> Option<&Event> {
        let position = usize::try_from(index).ok()?.checked_sub(1)?;
        self.events.get(position)
    }

    /// Index of the most recent event, 0 when the log is empty.
    pub fn last_index(&self) -> u32 {
        u32::try_from(self.events.len()).unwrap_or(u32::MAX)
    }

    /// The most recent event with its index.
    pub fn last(&self) -> Option<(u32, &Event)> {
        self.events.last().map(|e| (self.last_index(), e))
    }

    /// The acknowledgment pointer.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Move the acknowledgment pointer. Returns whether it changed.
    ///
    /// 0 means "nothing acknowledged" and cannot be set here.
    pub fn set_index(&mut self, index: u32) -> bool {
        if index == 0 || index == self.index {
            return false;
        }
        self.index = index;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
