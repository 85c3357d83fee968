//! Handler behaviour of a single simulated controller.

use rstest::{fixture, rstest};
use std::net::{Ipv4Addr, SocketAddr};
use uhppote_core::{Date, DateTime, MacAddress, SerialNumber};
use uhppote_emulator::{Device, Door, Snapshot};
use uhppote_protocol::messages::*;
use uhppote_protocol::{Request, Response};

const SERIAL: u32 = 405419896;
const OTHER: u32 = 303986753;
const MAGIC: u32 = 0x55aa_aa55;

fn serial() -> SerialNumber {
    SerialNumber::new(SERIAL)
}

fn src() -> SocketAddr {
    "192.168.1.10:54321".parse().unwrap()
}

#[fixture]
fn device() -> Device {
    Device::new(Snapshot::new(
        serial(),
        MacAddress::new([0x00, 0x12, 0x23, 0x34, 0x45, 0x56]),
    ))
}

fn put_card(card_number: u32, from: Date, to: Date, doors: [bool; 4]) -> Request {
    PutCardRequest {
        serial_number: serial(),
        card_number,
        from,
        to,
        door1: doors[0],
        door2: doors[1],
        door3: doors[2],
        door4: doors[3],
    }
    .into()
}

fn always() -> (Date, Date) {
    (
        Date::from_ymd(2000, 1, 1).unwrap(),
        Date::from_ymd(2099, 12, 31).unwrap(),
    )
}

fn card_count(device: &mut Device) -> u32 {
    let request = GetCardsRequest {
        serial_number: serial(),
    };
    match device.handle(&request.into(), src()) {
        Some(Response::GetCards(reply)) => reply.records,
        other => panic!("unexpected reply {other:?}"),
    }
}

#[rstest]
fn test_find_is_answered_unconditionally(mut device: Device) {
    let reply = device.handle(&FindRequest {}.into(), src());

    let Some(Response::Find(reply)) = reply else {
        panic!("expected a find reply");
    };
    assert_eq!(reply.serial_number, serial());
    assert_eq!(reply.subnet, Ipv4Addr::new(255, 255, 255, 0));
}

#[rstest]
fn test_other_serial_number_is_ignored(mut device: Device) {
    let request = GetStatusRequest {
        serial_number: SerialNumber::new(OTHER),
    };
    assert!(device.handle(&request.into(), src()).is_none());

    let request = PutCardRequest {
        serial_number: SerialNumber::new(OTHER),
        card_number: 1,
        from: always().0,
        to: always().1,
        door1: true,
        door2: true,
        door3: true,
        door4: true,
    };
    assert!(device.handle(&request.into(), src()).is_none());
    assert_eq!(device.snapshot().cards.count(), 0);
    assert!(!device.is_dirty());
}

#[rstest]
fn test_put_card_then_count(mut device: Device) {
    let before = card_count(&mut device);
    let reply = device.handle(
        &put_card(
            65538,
            Date::from_ymd(2024, 1, 1).unwrap(),
            Date::from_ymd(2024, 12, 31).unwrap(),
            [false, false, true, false],
        ),
        src(),
    );

    assert!(matches!(reply, Some(Response::PutCard(PutCardResponse { succeeded: true, .. }))));
    assert_eq!(card_count(&mut device), before + 1);
    assert!(device.is_dirty());
}

#[rstest]
fn test_put_card_twice_is_an_update(mut device: Device) {
    let (from, to) = always();
    device.handle(&put_card(65538, from, to, [true, false, false, false]), src());
    device.handle(&put_card(65538, from, to, [false, true, false, false]), src());

    assert_eq!(card_count(&mut device), 1);

    let request = GetCardByIdRequest {
        serial_number: serial(),
        card_number: 65538,
    };
    let Some(Response::GetCardById(reply)) = device.handle(&request.into(), src()) else {
        panic!("expected a card reply");
    };
    assert!(!reply.door1);
    assert!(reply.door2);
    assert_eq!(reply.from, Some(from));
}

#[rstest]
fn test_missing_card_is_all_zero(mut device: Device) {
    let request = GetCardByIndexRequest {
        serial_number: serial(),
        index: 1,
    };
    let Some(Response::GetCardByIndex(reply)) = device.handle(&request.into(), src()) else {
        panic!("expected a card reply");
    };
    assert_eq!(reply.card_number, 0);
    assert_eq!(reply.from, None);
    assert_eq!(reply.to, None);
}

#[rstest]
fn test_delete_card(mut device: Device) {
    let (from, to) = always();
    device.handle(&put_card(1, from, to, [true; 4]), src());

    let delete = |card_number| -> Request {
        DeleteCardRequest {
            serial_number: serial(),
            card_number,
        }
        .into()
    };

    assert!(matches!(
        device.handle(&delete(2), src()),
        Some(Response::DeleteCard(DeleteCardResponse { succeeded: false, .. }))
    ));
    assert!(matches!(
        device.handle(&delete(1), src()),
        Some(Response::DeleteCard(DeleteCardResponse { succeeded: true, .. }))
    ));
    assert_eq!(card_count(&mut device), 0);
}

#[rstest]
#[case(MAGIC, true)]
#[case(0x1234_5678, false)]
#[case(0, false)]
fn test_delete_all_cards_needs_magic_word(mut device: Device, #[case] magic_word: u32, #[case] accepted: bool) {
    let (from, to) = always();
    device.handle(&put_card(1, from, to, [true; 4]), src());
    device.persist_if_dirty().unwrap();

    let request = DeleteAllCardsRequest {
        serial_number: serial(),
        magic_word,
    };
    let reply = device.handle(&request.into(), src());

    assert_eq!(reply.is_some(), accepted);
    assert_eq!(card_count(&mut device), if accepted { 0 } else { 1 });
    assert_eq!(device.is_dirty(), accepted);
}

#[rstest]
fn test_set_address_is_silent(mut device: Device) {
    let request = SetAddressRequest {
        serial_number: serial(),
        address: Ipv4Addr::new(192, 168, 1, 125),
        subnet: Ipv4Addr::new(255, 255, 255, 0),
        gateway: Ipv4Addr::new(192, 168, 1, 1),
        magic_word: MAGIC,
    };

    assert!(device.handle(&request.into(), src()).is_none());
    assert_eq!(device.snapshot().address, Ipv4Addr::new(192, 168, 1, 125));
    assert_eq!(device.snapshot().gateway, Ipv4Addr::new(192, 168, 1, 1));
}

#[rstest]
fn test_set_address_with_bad_magic_word(mut device: Device) {
    let request = SetAddressRequest {
        serial_number: serial(),
        address: Ipv4Addr::new(192, 168, 1, 125),
        subnet: Ipv4Addr::new(255, 255, 255, 0),
        gateway: Ipv4Addr::new(192, 168, 1, 1),
        magic_word: 0,
    };

    assert!(device.handle(&request.into(), src()).is_none());
    assert_eq!(device.snapshot().address, Ipv4Addr::UNSPECIFIED);
}

#[rstest]
fn test_swipe_granted_opens_door(mut device: Device) {
    let (from, to) = always();
    device.handle(&put_card(65538, from, to, [false, false, true, false]), src());

    let (granted, index) = device.swipe(65538, 3);

    assert!(granted);
    assert_eq!(index, 1);
    let event = device.snapshot().events.get(1).unwrap();
    assert_eq!((event.event_type, event.result), (0x02, 0x01));
    assert!(event.granted);
    assert!(device.snapshot().doors[&3].is_open());
}

#[rstest]
#[case::unknown_card(99, 3)]
#[case::door_not_permitted(65538, 1)]
fn test_swipe_denied(mut device: Device, #[case] card: u32, #[case] door: u8) {
    let (from, to) = always();
    device.handle(&put_card(65538, from, to, [false, false, true, false]), src());

    let (granted, index) = device.swipe(card, door);

    assert!(!granted);
    let event = device.snapshot().events.get(index).unwrap();
    assert_eq!((event.event_type, event.result), (0x01, 0x06));
    assert!(!event.granted);
    assert!(!device.snapshot().doors[&door].is_open());
}

#[rstest]
fn test_swipe_expired_card(mut device: Device) {
    device.handle(
        &put_card(
            7,
            Date::from_ymd(2000, 1, 1).unwrap(),
            Date::from_ymd(2000, 12, 31).unwrap(),
            [true; 4],
        ),
        src(),
    );

    assert!(!device.swipe(7, 1).0);
}

#[rstest]
fn test_open_door_records_remote_event(mut device: Device) {
    let request = OpenDoorRequest {
        serial_number: serial(),
        door: 4,
    };
    let reply = device.handle(&request.into(), src());

    assert!(matches!(
        reply,
        Some(Response::OpenDoor(OpenDoorResponse { succeeded: true, .. }))
    ));
    let event = device.snapshot().events.get(1).unwrap();
    assert_eq!(event.card, 3922570474);
    assert_eq!((event.event_type, event.result), (0x02, 0x2c));
    assert_eq!(event.door, 4);
}

#[rstest]
#[case(0)]
#[case(5)]
fn test_open_invalid_door_is_refused(mut device: Device, #[case] door: u8) {
    let request = OpenDoorRequest {
        serial_number: serial(),
        door,
    };
    assert!(device.handle(&request.into(), src()).is_none());
    assert!(device.snapshot().events.is_empty());
}

#[rstest]
fn test_events_are_pushed_to_listener(mut device: Device) {
    let listener = SetListenerRequest {
        serial_number: serial(),
        address: Ipv4Addr::new(192, 168, 1, 100),
        port: 60001,
    };
    device.handle(&listener.into(), src());
    assert!(device.take_outbox().is_empty());

    device.swipe(1, 1);
    let outbox = device.take_outbox();

    assert_eq!(outbox.len(), 1);
    let (Response::GetStatus(status), addr) = &outbox[0] else {
        panic!("expected a status push");
    };
    assert_eq!(*addr, "192.168.1.100:60001".parse::<SocketAddr>().unwrap());
    assert_eq!(status.last_event_index, 1);
    assert_eq!(status.event_result, 0x06);
    assert!(device.take_outbox().is_empty());
}

#[rstest]
fn test_no_listener_no_push(mut device: Device) {
    device.swipe(1, 1);
    assert!(device.take_outbox().is_empty());
}

#[rstest]
fn test_get_listener_defaults_to_zero(mut device: Device) {
    let request = GetListenerRequest {
        serial_number: serial(),
    };
    let Some(Response::GetListener(reply)) = device.handle(&request.into(), src()) else {
        panic!("expected a listener reply");
    };
    assert_eq!(reply.address, Ipv4Addr::UNSPECIFIED);
    assert_eq!(reply.port, 0);
}

#[rstest]
fn test_get_event(mut device: Device) {
    device.swipe(42, 2);

    let get = |index| -> Request {
        GetEventRequest {
            serial_number: serial(),
            index,
        }
        .into()
    };

    let Some(Response::GetEvent(reply)) = device.handle(&get(1), src()) else {
        panic!("expected an event reply");
    };
    assert_eq!(reply.index, 1);
    assert_eq!(reply.card_number, 42);
    assert_eq!(reply.door, 2);

    assert!(device.handle(&get(0), src()).is_none());
    assert!(device.handle(&get(2), src()).is_none());
}

#[rstest]
fn test_event_index(mut device: Device) {
    let set = |index, magic_word| -> Request {
        SetEventIndexRequest {
            serial_number: serial(),
            index,
            magic_word,
        }
        .into()
    };
    let changed = |reply: Option<Response>| match reply {
        Some(Response::SetEventIndex(r)) => Some(r.changed),
        _ => None,
    };

    assert_eq!(changed(device.handle(&set(17, MAGIC), src())), Some(true));
    assert_eq!(changed(device.handle(&set(17, MAGIC), src())), Some(false));
    assert_eq!(changed(device.handle(&set(0, MAGIC), src())), Some(false));
    assert_eq!(changed(device.handle(&set(18, 0), src())), None);

    let request = GetEventIndexRequest {
        serial_number: serial(),
    };
    let Some(Response::GetEventIndex(reply)) = device.handle(&request.into(), src()) else {
        panic!("expected an index reply");
    };
    assert_eq!(reply.index, 17);
}

#[rstest]
fn test_door_control(mut device: Device) {
    let request = SetDoorControlRequest {
        serial_number: serial(),
        door: 2,
        control: 1,
        delay: 9,
    };
    let Some(Response::SetDoorControl(reply)) = device.handle(&request.into(), src()) else {
        panic!("expected a door control reply");
    };
    assert_eq!((reply.door, reply.control, reply.delay), (2, 1, 9));

    let request = GetDoorControlRequest {
        serial_number: serial(),
        door: 2,
    };
    let Some(Response::GetDoorControl(reply)) = device.handle(&request.into(), src()) else {
        panic!("expected a door control reply");
    };
    assert_eq!((reply.control, reply.delay), (1, 9));
}

#[rstest]
#[case::bad_door(5, 3)]
#[case::bad_control(1, 4)]
fn test_door_control_refused(mut device: Device, #[case] door: u8, #[case] control: u8) {
    let request = SetDoorControlRequest {
        serial_number: serial(),
        door,
        control,
        delay: 9,
    };
    assert!(device.handle(&request.into(), src()).is_none());
    assert!(!device.is_dirty());
}

#[rstest]
fn test_set_time_moves_device_clock(mut device: Device) {
    let target = DateTime::from_ymd_hms(2030, 6, 1, 12, 0, 0).unwrap();
    let request = SetTimeRequest {
        serial_number: serial(),
        datetime: target,
    };

    let Some(Response::SetTime(reply)) = device.handle(&request.into(), src()) else {
        panic!("expected a time reply");
    };

    let drift = (reply.datetime.inner() - target.inner()).num_seconds().abs();
    assert!(drift <= 2, "device clock off by {drift}s");
    assert_ne!(device.snapshot().offset, 0);

    let request = GetTimeRequest {
        serial_number: serial(),
    };
    let Some(Response::GetTime(reply)) = device.handle(&request.into(), src()) else {
        panic!("expected a time reply");
    };
    assert_eq!(reply.datetime.inner().date(), target.inner().date());
}

#[rstest]
fn test_status_reflects_last_event(mut device: Device) {
    device.swipe(42, 2);
    device.swipe(43, 3);

    let request = GetStatusRequest {
        serial_number: serial(),
    };
    let Some(Response::GetStatus(status)) = device.handle(&request.into(), src()) else {
        panic!("expected a status reply");
    };
    assert_eq!(status.last_event_index, 2);
    assert_eq!(status.event_card_number, 43);
    assert_eq!(status.event_door, 3);
    assert!(status.event_timestamp.is_some());
    assert!(!status.door3_open);
}

#[rstest]
fn test_read_only_queries_leave_device_clean(mut device: Device) {
    let requests: Vec<Request> = vec![
        GetCardsRequest { serial_number: serial() }.into(),
        GetEventIndexRequest { serial_number: serial() }.into(),
        GetListenerRequest { serial_number: serial() }.into(),
        GetStatusRequest { serial_number: serial() }.into(),
        GetEventRequest { serial_number: serial(), index: 1 }.into(),
    ];

    for request in requests {
        device.handle(&request, src());
        assert!(!device.is_dirty(), "{:?} marked the device dirty", request.msg_type());
    }
}

#[rstest]
#[case::last_century(1999, 6, 15)]
#[case::next_century(2100, 1, 1)]
fn test_status_encodes_after_clock_leaves_century(
    mut device: Device,
    #[case] year: i32,
    #[case] month: u32,
    #[case] day: u32,
) {
    let request = SetTimeRequest {
        serial_number: serial(),
        datetime: DateTime::from_ymd_hms(year, month, day, 12, 0, 0).unwrap(),
    };
    assert!(device.handle(&request.into(), src()).is_some());
    device.swipe(42, 1);

    let request = GetStatusRequest {
        serial_number: serial(),
    };
    let Some(reply @ Response::GetStatus(_)) = device.handle(&request.into(), src()) else {
        panic!("expected a status reply");
    };
    assert!(reply.encode().is_ok());

    let Response::GetStatus(status) = reply else {
        unreachable!();
    };
    assert_eq!(status.system_date.to_bcd().unwrap()[0], bcd_year(year));
}

fn bcd_year(year: i32) -> u8 {
    let year = u8::try_from(year.rem_euclid(100)).unwrap();
    ((year / 10) << 4) | (year % 10)
}

#[rstest]
fn test_clock_saturates_at_year_9999() {
    let mut snapshot = Snapshot::new(serial(), MacAddress::new([0x00, 0x12, 0x23, 0x34, 0x45, 0x56]));
    snapshot.offset = 400_000_000_000;
    let mut device = Device::new(snapshot);

    let request = GetTimeRequest {
        serial_number: serial(),
    };
    let Some(reply @ Response::GetTime(_)) = device.handle(&request.into(), src()) else {
        panic!("expected a time reply");
    };
    assert!(reply.encode().is_ok());
    let Response::GetTime(time) = reply else {
        unreachable!();
    };
    assert_eq!(time.datetime, DateTime::from_ymd_hms(9999, 12, 31, 23, 59, 59).unwrap());

    device.swipe(42, 1);
    let request = GetStatusRequest {
        serial_number: serial(),
    };
    let reply = device.handle(&request.into(), src()).unwrap();
    assert!(reply.encode().is_ok());
}

#[rstest]
#[case(0)]
#[case(7)]
fn test_doors_outside_one_to_four_are_refused(#[case] door: u8) {
    let mut snapshot = Snapshot::new(serial(), MacAddress::new([0x00, 0x12, 0x23, 0x34, 0x45, 0x56]));
    snapshot.doors.insert(0, Door::default());
    snapshot.doors.insert(7, Door::default());
    let mut device = Device::new(snapshot);

    let requests: Vec<Request> = vec![
        OpenDoorRequest { serial_number: serial(), door }.into(),
        SetDoorControlRequest { serial_number: serial(), door, control: 1, delay: 9 }.into(),
        GetDoorControlRequest { serial_number: serial(), door }.into(),
    ];
    for request in requests {
        assert!(device.handle(&request, src()).is_none(), "{:?} was answered", request.msg_type());
    }
    assert!(device.snapshot().events.is_empty());
    assert!(!device.is_dirty());
}
