#![forbid(unsafe_code)]

pub use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Hex encoding of an empty slot payload as submitted to the ledger.
/// The contract rejects zero-length `bytes` arguments, so `0x` is never sent.
pub const PLACEHOLDER_HEX: &str = "0x00";

/// Hex encoding of a zero-length byte string.
pub const EMPTY_HEX: &str = "0x";

pub type RoomId = u64;
pub type StatusCode = u64;

/// One bookable time unit within a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Position index within the room.
    pub id: usize,
    pub status: StatusCode,
    pub data: String,
}

/// Application-level projection of a room at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub capacity: u64,
    pub slots: Vec<Slot>,
}

/// Room state exactly as the contract returns it: parallel status/data
/// sequences, `data` still hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRoom {
    pub capacity: u64,
    pub status: Vec<StatusCode>,
    pub data: Vec<String>,
}

/// Hash of a submitted (not necessarily mined) transaction, as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl core::fmt::Display for TxHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub success: bool,
}

pub type BookingResult<T> = Result<T, BookingError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Binding to the ledger or the contract failed.
    Connection(String),
    /// A read call failed remotely.
    Query(String),
    /// A returned payload could not be decoded.
    Decode(String),
    /// The node refused a write transaction.
    Submission(String),
    /// The configured sender account is not available on the node.
    NoAccount,
    InvalidArgument(String),
    Reverted(TxHash),
    Unconfirmed(TxHash),
}

impl core::fmt::Display for BookingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BookingError::Connection(msg) => write!(f, "connection error: {msg}"),
            BookingError::Query(msg) => write!(f, "query error: {msg}"),
            BookingError::Decode(msg) => write!(f, "decode error: {msg}"),
            BookingError::Submission(msg) => write!(f, "submission error: {msg}"),
            BookingError::NoAccount => write!(f, "no sender account available"),
            BookingError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            BookingError::Reverted(tx) => write!(f, "transaction {tx} reverted"),
            BookingError::Unconfirmed(tx) => write!(f, "transaction {tx} not mined in time"),
        }
    }
}

impl std::error::Error for BookingError {}
