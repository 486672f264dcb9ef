#![forbid(unsafe_code)]

//! Slot payload codec.
//!
//! Slot `data` travels as a `0x`-prefixed hex byte string holding UTF-8
//! text. NUL bytes at either end are padding and are stripped in both
//! directions, so the placeholder `0x00` decodes to the empty string.

use booking_core::{BookingError, BookingResult, EMPTY_HEX, PLACEHOLDER_HEX};

/// Lowercase `0x`-prefixed hex of raw bytes.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a strict `0x`-prefixed hex string into bytes.
pub fn from_hex(s: &str) -> BookingResult<Vec<u8>> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| BookingError::Decode(format!("{s:?} is not 0x-prefixed hex")))?;
    hex::decode(digits).map_err(|e| BookingError::Decode(format!("{s:?}: {e}")))
}

fn trim_nul(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| *b != 0).map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Encodes text as hex. Empty (or all-NUL) text yields `0x`.
pub fn utf8_to_hex(text: &str) -> String {
    to_hex(trim_nul(text.as_bytes()))
}

/// Decodes a hex payload back to text, dropping NUL padding.
pub fn hex_to_utf8(s: &str) -> BookingResult<String> {
    let bytes = from_hex(s)?;
    let text = trim_nul(&bytes);
    String::from_utf8(text.to_vec())
        .map_err(|e| BookingError::Decode(format!("{s:?} is not UTF-8: {e}")))
}

/// Replaces the zero-length encoding with the one-byte placeholder.
pub fn fill_data(hex: String) -> String {
    if hex == EMPTY_HEX {
        PLACEHOLDER_HEX.to_string()
    } else {
        hex
    }
}

/// Wire form of a slot payload as submitted with `setSlots`.
pub fn encode_slot_data(text: &str) -> String {
    fill_data(utf8_to_hex(text))
}

pub fn decode_slot_data(hex: &str) -> BookingResult<String> {
    hex_to_utf8(hex)
}
