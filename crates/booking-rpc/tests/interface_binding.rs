use booking_core::BookingError;
use booking_rpc::artifact::{RoomLayout, SlotPayload};
use booking_rpc::{Artifact, BookingInterface};

const FIXTURE: &str = include_str!("fixtures/Booking.json");
const FIXTURE_BYTES32: &str = include_str!("fixtures/Booking32.json");

#[test]
fn test_fixture_binds_all_functions() {
    let artifact = Artifact::from_json(FIXTURE).unwrap();
    assert_eq!(artifact.contract_name.as_deref(), Some("Booking"));

    let iface = BookingInterface::bind(&artifact).unwrap();
    assert_eq!(iface.list_rooms.signature(), "listRooms()");
    assert_eq!(iface.get_room.signature(), "getRoom(uint256,uint256)");
    assert_eq!(iface.set_slots.signature(), "setSlots(uint256,bytes[])");
    assert_eq!(iface.set_room.signature(), "setRoom(uint256,uint256)");
    assert_eq!(iface.slot_payload, SlotPayload::Dynamic);
    assert_eq!(iface.room_layout, RoomLayout { capacity: 0, status: 1, data: 2 });
}

#[test]
fn test_bare_abi_array_binds() {
    let full: serde_json::Value = serde_json::from_str(FIXTURE).unwrap();
    let bare = full["abi"].to_string();

    let artifact = Artifact::from_json(&bare).unwrap();
    assert_eq!(artifact.contract_name, None);
    assert!(BookingInterface::bind(&artifact).is_ok());
}

#[test]
fn test_bytes32_payloads_bind_as_fixed() {
    let artifact = Artifact::from_json(FIXTURE_BYTES32).unwrap();
    let iface = BookingInterface::bind(&artifact).unwrap();
    assert_eq!(iface.slot_payload, SlotPayload::Fixed(32));
    assert_eq!(iface.set_slots.signature(), "setSlots(uint256,bytes32[])");
}

#[test]
fn test_room_outputs_located_by_name() {
    let mut artifact = Artifact::from_json(FIXTURE).unwrap();
    artifact.abi.functions.get_mut("getRoom").unwrap()[0].outputs.reverse();

    let iface = BookingInterface::bind(&artifact).unwrap();
    assert_eq!(iface.room_layout, RoomLayout { capacity: 2, status: 1, data: 0 });
}

#[test]
fn test_wrong_arity_is_rejected() {
    let mut artifact = Artifact::from_json(FIXTURE).unwrap();
    artifact.abi.functions.get_mut("getRoom").unwrap()[0].inputs.pop();

    assert!(matches!(BookingInterface::bind(&artifact), Err(BookingError::Connection(_))));
}

#[test]
fn test_call_data_starts_with_selector() {
    let artifact = Artifact::from_json(FIXTURE).unwrap();
    let iface = BookingInterface::bind(&artifact).unwrap();
    let m = &iface.set_room;

    let data = m.encode_call(&[m.uint_arg(0, 1), m.uint_arg(1, 2)]).unwrap();
    assert_eq!(data.len(), 4 + 2 * 32);
    assert_eq!(&data[..4], &m.function.selector()[..]);
    assert_eq!(data[4 + 31], 1);
    assert_eq!(data[4 + 63], 2);

    assert!(matches!(m.encode_call(&[m.uint_arg(0, 1)]), Err(BookingError::InvalidArgument(_))));
}
