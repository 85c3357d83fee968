//! Door configuration and the transient open state.
//!
//! A door is open until an absolute instant computed when it was opened.
//! Nothing runs when the door closes; the state is evaluated on query.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use uhppote_core::constants::DEFAULT_DOOR_DELAY;

/// Door control mode, byte 9 of the door control messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum DoorControl {
    NormallyOpen = 1,
    NormallyClosed = 2,
    #[default]
    Controlled = 3,
}

impl TryFrom<u8> for DoorControl {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DoorControl::NormallyOpen),
            2 => Ok(DoorControl::NormallyClosed),
            3 => Ok(DoorControl::Controlled),
            other => Err(format!("invalid door control mode {other}")),
        }
    }
}

impl From<DoorControl> for u8 {
    fn from(control: DoorControl) -> Self {
        control as u8
    }
}

impl fmt::Display for DoorControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DoorControl::NormallyOpen => "normally open",
            DoorControl::NormallyClosed => "normally closed",
            DoorControl::Controlled => "controlled",
        };
        f.write_str(name)
    }
}

/// One physical door.
///
/// Only `delay` and `control` are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    /// Unlock time in seconds.
    pub delay: u8,
    #[serde(default)]
    pub control: DoorControl,
    #[serde(skip)]
    open_until: Option<Instant>,
}

impl Default for Door {
    fn default() -> Self {
        Door {
            delay: DEFAULT_DOOR_DELAY,
            control: DoorControl::default(),
            open_until: None,
        }
    }
}

impl Door {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the door for the configured delay. Always succeeds.
    pub fn open(&mut self) -> bool {
        self.open_at(Instant::now())
    }

    pub fn is_open(&self) -> bool {
        self.is_open_at(Instant::now())
    }

    /// Replace the delay. A door that is already open keeps its close time.
    pub fn set_delay(&mut self, seconds: u8) {
        self.delay = seconds;
    }

    pub(crate) fn open_at(&mut self, now: Instant) -> bool {
        self.open_until = Some(now + Duration::from_secs(u64::from(self.delay)));
        true
    }

    pub(crate) fn is_open_at(&self, now: Instant) -> bool {
        self.open_until.is_some_and(|until| now < until)
    }
}
