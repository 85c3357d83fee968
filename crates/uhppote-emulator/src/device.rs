//! A simulated UT0311-L0x controller.
//!
//! [`Device::handle`] is the single entry point for decoded requests. Every
//! handler follows the same policy:
//!
//! - requests carrying another controller's serial number are ignored
//! - privileged commands with a wrong magic word are refused without reply
//! - state changes mark the device dirty; the caller persists with
//!   [`Device::persist_if_dirty`] after queueing the reply
//!
//! Recording an event also queues an unsolicited status frame for the
//! registered listener. Those frames collect in an outbox drained with
//! [`Device::take_outbox`].

use crate::entities::{Card, Door, DoorControl, Event, EventKind, event::REMOTE_OPEN_CARD};
use crate::error::SnapshotResult;
use crate::snapshot::Snapshot;
use chrono::{NaiveDateTime, TimeDelta, Utc};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uhppote_core::constants::DOOR_COUNT;
use uhppote_core::{Date, DateTime, SerialNumber, SystemDate, SystemTime, is_magic_word};
use uhppote_protocol::messages::*;
use uhppote_protocol::{Request, Response};

#[derive(Debug)]
pub struct Device {
    state: Snapshot,
    path: Option<PathBuf>,
    dirty: bool,
    outbox: Vec<(Response, SocketAddr)>,
}

impl Device {
    /// A device held only in memory.
    pub fn new(state: Snapshot) -> Self {
        Device {
            state,
            path: None,
            dirty: false,
            outbox: Vec::new(),
        }
    }

    /// Load a device from its snapshot file. Saves go back to the same file.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be read.
    pub fn load(path: &Path) -> SnapshotResult<Self> {
        let state = Snapshot::load(path)?;
        Ok(Device {
            path: Some(path.to_path_buf()),
            ..Device::new(state)
        })
    }

    pub fn serial_number(&self) -> SerialNumber {
        self.state.serial_number
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Device-local time: host UTC plus the stored offset, to the second.
    ///
    /// Saturates at the ends of the range a BCD timestamp can carry, so a
    /// clock pushed past year 9999 keeps reporting 9999-12-31 23:59:59.
    pub fn now(&self) -> NaiveDateTime {
        let host = Utc::now().naive_utc();
        let local = TimeDelta::try_seconds(self.state.offset)
            .and_then(|offset| host.checked_add_signed(offset))
            .unwrap_or(host);
        DateTime::saturating(local).inner()
    }

    /// Handle one decoded request from `src`.
    ///
    /// Returns the reply, if any. Event pushes produced on the way are left
    /// in the outbox.
    pub fn handle(&mut self, request: &Request, src: SocketAddr) -> Option<Response> {
        if let Some(serial) = request.serial_number()
            && serial != self.serial_number()
        {
            return None;
        }

        debug!(
            serial_number = %self.serial_number(),
            addr = %src,
            "{}",
            request.msg_type()
        );

        if request.msg_type().is_privileged() && !self.authorised(request) {
            return None;
        }

        match request {
            Request::Find(_) => Some(self.find().into()),
            Request::SetAddress(rq) => {
                self.set_address(rq);
                None
            }
            Request::GetStatus(_) => Some(self.status().into()),
            Request::SetTime(rq) => Some(self.set_time(rq).into()),
            Request::GetTime(_) => Some(self.get_time().into()),
            Request::OpenDoor(rq) => self.open_door(rq).map(Response::from),
            Request::PutCard(rq) => Some(self.put_card(rq).into()),
            Request::DeleteCard(rq) => Some(self.delete_card(rq).into()),
            Request::DeleteAllCards(_) => Some(self.delete_all_cards().into()),
            Request::GetCards(_) => Some(self.get_cards().into()),
            Request::GetCardById(rq) => Some(self.get_card_by_id(rq).into()),
            Request::GetCardByIndex(rq) => Some(self.get_card_by_index(rq).into()),
            Request::SetDoorControl(rq) => self.set_door_control(rq).map(Response::from),
            Request::GetDoorControl(rq) => self.get_door_control(rq).map(Response::from),
            Request::SetListener(rq) => Some(self.set_listener(rq).into()),
            Request::GetListener(_) => Some(self.get_listener().into()),
            Request::GetEvent(rq) => self.get_event(rq).map(Response::from),
            Request::SetEventIndex(rq) => Some(self.set_event_index(rq).into()),
            Request::GetEventIndex(_) => Some(self.get_event_index().into()),
        }
    }

    /// Present `card` at `door`.
    ///
    /// Access is granted if the card is stored, permits the door and the
    /// device-local date is inside its validity window. Returns whether
    /// access was granted and the index of the recorded event.
    pub fn swipe(&mut self, card: u32, door: u8) -> (bool, u32) {
        let today = self.now().date();
        let permitted = self
            .state
            .cards
            .get(card)
            .is_some_and(|c| c.permits(door) && c.is_valid_on(today));

        let (kind, opened) = match self.door_mut(door) {
            Some(d) if permitted => (EventKind::SwipeGranted, d.open()),
            _ => (EventKind::SwipeDenied, false),
        };

        let index = self.record_event(kind, door, opened, card);
        (kind.granted() && opened, index)
    }

    /// Save the snapshot if a handler changed it since the last save.
    ///
    /// Devices without a snapshot file are simply marked clean. The dirty
    /// flag survives a failed save so the next mutation retries.
    ///
    /// # Errors
    /// Returns the snapshot error; the in-memory state is kept either way.
    pub fn persist_if_dirty(&mut self) -> SnapshotResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        if let Some(path) = &self.path {
            self.state.save(path)?;
        }
        self.dirty = false;
        Ok(true)
    }

    /// Unsolicited frames queued since the last call, with destinations.
    pub fn take_outbox(&mut self) -> Vec<(Response, SocketAddr)> {
        std::mem::take(&mut self.outbox)
    }

    fn find(&self) -> FindResponse {
        FindResponse {
            serial_number: self.serial_number(),
            address: self.state.address,
            subnet: self.state.subnet,
            gateway: self.state.gateway,
            mac_address: self.state.mac_address,
            version: self.state.version,
            date: Date::new(self.now().date()),
        }
    }

    fn set_address(&mut self, rq: &SetAddressRequest) {
        self.state.address = rq.address;
        self.state.subnet = rq.subnet;
        self.state.gateway = rq.gateway;
        self.dirty = true;
    }

    fn status(&self) -> GetStatusResponse {
        let now = self.now();
        let door = |n: u8| self.state.doors.get(&n).is_some_and(Door::is_open);
        let last = self.state.events.last();

        GetStatusResponse {
            serial_number: self.serial_number(),
            last_event_index: last.map(|(index, _)| index).unwrap_or(0),
            event_type: last.map(|(_, e)| e.event_type).unwrap_or(0),
            event_granted: last.is_some_and(|(_, e)| e.granted),
            event_door: last.map(|(_, e)| e.door).unwrap_or(0),
            event_door_opened: last.is_some_and(|(_, e)| e.door_opened),
            event_card_number: last.map(|(_, e)| e.card).unwrap_or(0),
            event_timestamp: last.map(|(_, e)| e.timestamp),
            event_result: last.map(|(_, e)| e.result).unwrap_or(0),
            door1_open: door(1),
            door2_open: door(2),
            door3_open: door(3),
            door4_open: door(4),
            door1_button: false,
            door2_button: false,
            door3_button: false,
            door4_button: false,
            system_state: self.state.state,
            system_time: SystemTime::from(now),
            packet_number: self.state.packet_number,
            backup: self.state.backup,
            special_message: self.state.special_message,
            battery: self.state.battery,
            fire_alarm: self.state.fire_alarm,
            system_date: SystemDate::from(now),
        }
    }

    fn set_time(&mut self, rq: &SetTimeRequest) -> SetTimeResponse {
        let host = Utc::now().naive_utc();
        self.state.offset = (rq.datetime.inner() - host).num_seconds();
        self.dirty = true;

        SetTimeResponse {
            serial_number: self.serial_number(),
            datetime: self.datetime(),
        }
    }

    fn get_time(&self) -> GetTimeResponse {
        GetTimeResponse {
            serial_number: self.serial_number(),
            datetime: self.datetime(),
        }
    }

    fn open_door(&mut self, rq: &OpenDoorRequest) -> Option<OpenDoorResponse> {
        let serial_number = self.serial_number();
        let Some(door) = self.door_mut(rq.door) else {
            debug!(%serial_number, door = rq.door, "open-door: no such door");
            return None;
        };

        let opened = door.open();
        self.record_event(EventKind::RemoteOpen, rq.door, opened, REMOTE_OPEN_CARD);

        Some(OpenDoorResponse {
            serial_number,
            succeeded: opened,
        })
    }

    fn put_card(&mut self, rq: &PutCardRequest) -> PutCardResponse {
        self.state.cards.put(Card::new(
            rq.card_number,
            rq.from,
            rq.to,
            [rq.door1, rq.door2, rq.door3, rq.door4],
        ));
        self.dirty = true;

        PutCardResponse {
            serial_number: self.serial_number(),
            succeeded: true,
        }
    }

    fn delete_card(&mut self, rq: &DeleteCardRequest) -> DeleteCardResponse {
        let deleted = self.state.cards.delete(rq.card_number);
        self.dirty |= deleted;

        DeleteCardResponse {
            serial_number: self.serial_number(),
            succeeded: deleted,
        }
    }

    fn delete_all_cards(&mut self) -> DeleteAllCardsResponse {
        let succeeded = self.state.cards.delete_all();
        self.dirty = true;

        DeleteAllCardsResponse {
            serial_number: self.serial_number(),
            succeeded,
        }
    }

    fn get_cards(&self) -> GetCardsResponse {
        GetCardsResponse {
            serial_number: self.serial_number(),
            records: u32::try_from(self.state.cards.count()).unwrap_or(u32::MAX),
        }
    }

    fn get_card_by_id(&self, rq: &GetCardByIdRequest) -> GetCardByIdResponse {
        let card = CardRecord::from(self.state.cards.get(rq.card_number));
        GetCardByIdResponse {
            serial_number: self.serial_number(),
            card_number: card.number,
            from: card.from,
            to: card.to,
            door1: card.doors[0],
            door2: card.doors[1],
            door3: card.doors[2],
            door4: card.doors[3],
        }
    }

    fn get_card_by_index(&self, rq: &GetCardByIndexRequest) -> GetCardByIndexResponse {
        let card = CardRecord::from(self.state.cards.get_by_index(rq.index));
        GetCardByIndexResponse {
            serial_number: self.serial_number(),
            card_number: card.number,
            from: card.from,
            to: card.to,
            door1: card.doors[0],
            door2: card.doors[1],
            door3: card.doors[2],
            door4: card.doors[3],
        }
    }

    fn set_door_control(&mut self, rq: &SetDoorControlRequest) -> Option<SetDoorControlResponse> {
        let serial_number = self.serial_number();
        let Ok(control) = DoorControl::try_from(rq.control) else {
            debug!(%serial_number, control = rq.control, "set-door-control: invalid control mode");
            return None;
        };
        let Some(door) = self.door_mut(rq.door) else {
            debug!(%serial_number, door = rq.door, "set-door-control: no such door");
            return None;
        };

        door.control = control;
        door.set_delay(rq.delay);
        let delay = door.delay;
        self.dirty = true;
        debug!(%serial_number, door = rq.door, %control, delay, "door control set");

        Some(SetDoorControlResponse {
            serial_number,
            door: rq.door,
            control: u8::from(control),
            delay,
        })
    }

    fn get_door_control(&self, rq: &GetDoorControlRequest) -> Option<GetDoorControlResponse> {
        let door = self.door(rq.door)?;
        Some(GetDoorControlResponse {
            serial_number: self.serial_number(),
            door: rq.door,
            control: u8::from(door.control),
            delay: door.delay,
        })
    }

    fn set_listener(&mut self, rq: &SetListenerRequest) -> SetListenerResponse {
        self.state.listener.set(rq.address, rq.port);
        self.dirty = true;

        SetListenerResponse {
            serial_number: self.serial_number(),
            succeeded: true,
        }
    }

    fn get_listener(&self) -> GetListenerResponse {
        let (address, port) = self.state.listener.to_wire();
        GetListenerResponse {
            serial_number: self.serial_number(),
            address,
            port,
        }
    }

    fn get_event(&self, rq: &GetEventRequest) -> Option<GetEventResponse> {
        let event = self.state.events.get(rq.index)?;
        Some(GetEventResponse {
            serial_number: self.serial_number(),
            index: rq.index,
            event_type: event.event_type,
            granted: event.granted,
            door: event.door,
            door_opened: event.door_opened,
            card_number: event.card,
            timestamp: event.timestamp,
            result: event.result,
        })
    }

    fn set_event_index(&mut self, rq: &SetEventIndexRequest) -> SetEventIndexResponse {
        let changed = self.state.events.set_index(rq.index);
        self.dirty |= changed;

        SetEventIndexResponse {
            serial_number: self.serial_number(),
            changed,
        }
    }

    fn get_event_index(&self) -> GetEventIndexResponse {
        GetEventIndexResponse {
            serial_number: self.serial_number(),
            index: self.state.events.index(),
        }
    }

    /// Magic word check for privileged commands.
    fn authorised(&self, request: &Request) -> bool {
        let magic_word = request.magic_word().unwrap_or_default();
        let ok = is_magic_word(magic_word);
        if !ok {
            warn!(
                serial_number = %self.serial_number(),
                magic_word = %format!("{magic_word:08x}"),
                "{}: invalid magic word, refused",
                request.msg_type()
            );
        }
        ok
    }

    /// Door 1 to 4. Other numbers are refused even if a snapshot lists them.
    fn door(&self, door: u8) -> Option<&Door> {
        (1..=DOOR_COUNT)
            .contains(&door)
            .then(|| self.state.doors.get(&door))
            .flatten()
    }

    fn door_mut(&mut self, door: u8) -> Option<&mut Door> {
        if (1..=DOOR_COUNT).contains(&door) {
            self.state.doors.get_mut(&door)
        } else {
            None
        }
    }

    fn datetime(&self) -> DateTime {
        DateTime::new(self.now())
    }

    /// Append an event and queue a status push to the listener.
    fn record_event(&mut self, kind: EventKind, door: u8, opened: bool, card: u32) -> u32 {
        let event = Event::new(kind, door, opened, card, self.datetime());
        let index = self.state.events.add(event);
        self.dirty = true;

        if let Some(listener) = self.state.listener.get() {
            let status = self.status();
            self.outbox.push((status.into(), SocketAddr::V4(listener)));
        }

        index
    }
}

/// Load every snapshot in `dir`.
///
/// Files are read in lexical order. A file that fails to load is skipped
/// with a warning; so is a second file for a serial number already loaded.
///
/// # Errors
/// Returns an error only if the directory itself cannot be read.
pub fn load_dir(dir: &Path) -> SnapshotResult<Vec<Device>> {
    let mut devices: Vec<Device> = Vec::new();

    for path in crate::snapshot::discover(dir)? {
        let device = match Device::load(&path) {
            Ok(device) => device,
            Err(e) => {
                warn!(path = %path.display(), "skipping snapshot: {e}");
                continue;
            }
        };

        let serial_number = device.serial_number();
        if let Some(first) = devices.iter().find(|d| d.serial_number() == serial_number) {
            warn!(
                %serial_number,
                path = %path.display(),
                loaded = %first.path().unwrap_or(Path::new("")).display(),
                "duplicate serial number, keeping the first"
            );
            continue;
        }

        info!(%serial_number, path = %path.display(), "loaded device");
        devices.push(device);
    }

    Ok(devices)
}

/// Card fields as sent in lookup replies; all zero when absent.
struct CardRecord {
    number: u32,
    from: Option<Date>,
    to: Option<Date>,
    doors: [bool; 4],
}

impl From<Option<&Card>> for CardRecord {
    fn from(card: Option<&Card>) -> Self {
        match card {
            Some(card) => CardRecord {
                number: card.number,
                from: Some(card.from),
                to: Some(card.to),
                doors: card.door_flags(),
            },
            None => CardRecord {
                number: 0,
                from: None,
                to: None,
                doors: [false; 4],
            },
        }
    }
}
