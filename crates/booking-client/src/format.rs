use booking_codec::{decode_slot_data, encode_slot_data};
use booking_core::{BookingError, BookingResult, RawRoom, Room, RoomId, Slot};
use serde_json::Value;

/// Zips the parallel status/data sequences into slots.
/// Sequences of different length are rejected rather than truncated.
pub fn format_room(id: RoomId, raw: RawRoom) -> BookingResult<Room> {
    if raw.status.len() != raw.data.len() {
        return Err(BookingError::Decode(format!(
            "room {id}: {} status codes but {} data entries",
            raw.status.len(),
            raw.data.len()
        )));
    }

    let slots = raw
        .status
        .into_iter()
        .zip(raw.data.iter())
        .enumerate()
        .map(|(i, (status, data))| {
            Ok(Slot {
                id: i,
                status,
                data: decode_slot_data(data)?,
            })
        })
        .collect::<BookingResult<Vec<_>>>()?;

    Ok(Room {
        id,
        capacity: raw.capacity,
        slots,
    })
}

pub fn encode_slots(slots: &[Slot]) -> Vec<String> {
    slots.iter().map(|s| encode_slot_data(&s.data)).collect()
}

/// Pulls `data` out of each element of a UI slot array.
/// Returns `Ok(None)` when `value` is not an array at all.
pub fn encode_slot_values(value: &Value) -> BookingResult<Option<Vec<String>>> {
    let Some(items) = value.as_array() else {
        return Ok(None);
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item.get("data").and_then(Value::as_str) {
            Some(text) => Ok(encode_slot_data(text)),
            None => Err(BookingError::InvalidArgument(format!("slot {i} has no string data"))),
        })
        .collect::<BookingResult<Vec<_>>>()
        .map(Some)
}
