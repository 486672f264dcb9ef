#![forbid(unsafe_code)]

use async_trait::async_trait;
use booking_core::{Address, BookingResult, RawRoom, RoomId, TxHash, TxReceipt};

/// The Booking contract as exposed by a ledger client.
/// Implementations own ABI encoding, transport and signing.
///
/// INVARIANT: `set_slots`/`set_room` return once the node has accepted the
/// transaction. They never wait for it to be mined.
#[async_trait]
pub trait BookingContract: Send + Sync {
    /// Accounts the node can send from, in node order.
    async fn accounts(&self) -> BookingResult<Vec<Address>>;

    async fn list_rooms(&self) -> BookingResult<Vec<RoomId>>;

    /// Room state as of `timestamp` (Unix seconds).
    async fn get_room(&self, id: RoomId, timestamp: u64) -> BookingResult<RawRoom>;

    /// `data` entries are already hex encoded.
    async fn set_slots(&self, from: &Address, room_id: RoomId, data: Vec<String>) -> BookingResult<TxHash>;

    async fn set_room(&self, from: &Address, room_id: RoomId, capacity: u64) -> BookingResult<TxHash>;

    /// `None` while the transaction is still pending.
    async fn receipt(&self, tx: &TxHash) -> BookingResult<Option<TxReceipt>>;
}

/// The Wall Clock.
pub trait PlatformClock: Send + Sync {
    fn unix_seconds(&self) -> u64;
}

/// Clock pinned to one instant. Handy for replaying a room at a past time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl PlatformClock for FixedClock {
    fn unix_seconds(&self) -> u64 {
        self.0
    }
}
