#![forbid(unsafe_code)]

//! Read/write surface over the Booking contract.
//!
//! The client is stateless apart from its handles: every call is one
//! request against the ledger and nothing is cached. Writes resolve once
//! the node has accepted the transaction; use [`RoomLedgerClient::await_confirmation`]
//! when mining matters.

use log::{debug, info, warn};
use serde_json::Value;

use booking_core::{Address, BookingError, BookingResult, Room, RoomId, Slot, TxHash, TxReceipt};
use booking_hal::{BookingContract, PlatformClock};

pub mod config;
pub mod format;

pub use config::{ClientConfig, ConfirmationPolicy, SenderSelection};

pub struct RoomLedgerClient {
    contract: Box<dyn BookingContract>,
    clock: Box<dyn PlatformClock>,
    config: ClientConfig,
}

impl RoomLedgerClient {
    pub fn new(
        contract: Box<dyn BookingContract>,
        clock: Box<dyn PlatformClock>,
        config: ClientConfig,
    ) -> Self {
        Self { contract, clock, config }
    }

    /// Room ids in ledger order.
    pub async fn list_rooms_ids(&self) -> BookingResult<Vec<RoomId>> {
        let ids = self.contract.list_rooms().await?;
        debug!("[LEDGER] listRooms -> {} ids", ids.len());
        Ok(ids)
    }

    /// Snapshot of room `id` at `timestamp`, or now when `None`.
    pub async fn get_room(&self, id: RoomId, timestamp: Option<u64>) -> BookingResult<Room> {
        let at = timestamp.unwrap_or_else(|| self.clock.unix_seconds());
        let raw = self.contract.get_room(id, at).await?;
        debug!("[LEDGER] getRoom({id}, {at}) -> {} slots", raw.status.len());
        format::format_room(id, raw)
    }

    /// Submits the payloads of `slots` for `room_id`.
    pub async fn set_slots(&self, room_id: RoomId, slots: &[Slot]) -> BookingResult<TxHash> {
        let data = format::encode_slots(slots);
        self.submit_slots(room_id, data).await
    }

    /// Untyped variant taking the UI's slot array as JSON.
    ///
    /// Anything other than an array is ignored: no ledger call is made and
    /// `Ok(None)` is returned.
    pub async fn set_slots_value(&self, room_id: RoomId, slots: &Value) -> BookingResult<Option<TxHash>> {
        match format::encode_slot_values(slots)? {
            Some(data) => self.submit_slots(room_id, data).await.map(Some),
            None => {
                debug!("setSlots({room_id}) ignored: argument is not a slot array");
                Ok(None)
            }
        }
    }

    pub async fn set_room(&self, room_id: RoomId, capacity: u64) -> BookingResult<TxHash> {
        let from = self.resolve_sender().await?;
        let tx = self.contract.set_room(&from, room_id, capacity).await?;
        info!("[LEDGER] setRoom({room_id}, {capacity}) submitted from {from}: {tx}");
        Ok(tx)
    }

    /// Polls for the receipt of `tx` until it is mined or the policy gives up.
    pub async fn await_confirmation(&self, tx: &TxHash, policy: ConfirmationPolicy) -> BookingResult<TxReceipt> {
        let attempts = policy.max_attempts();
        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(policy.poll_interval()).await;
            }
            match self.contract.receipt(tx).await? {
                Some(receipt) if receipt.success => {
                    info!("[LEDGER] {tx} mined in block {}", receipt.block_number);
                    return Ok(receipt);
                }
                Some(_) => return Err(BookingError::Reverted(tx.clone())),
                None => debug!("{tx} pending (attempt {})", attempt + 1),
            }
        }
        warn!("[LEDGER] {tx} still pending after {attempts} polls");
        Err(BookingError::Unconfirmed(tx.clone()))
    }

    async fn submit_slots(&self, room_id: RoomId, data: Vec<String>) -> BookingResult<TxHash> {
        let from = self.resolve_sender().await?;
        let count = data.len();
        let tx = self.contract.set_slots(&from, room_id, data).await?;
        info!("[LEDGER] setSlots({room_id}, {count} slots) submitted from {from}: {tx}");
        Ok(tx)
    }

    async fn resolve_sender(&self) -> BookingResult<Address> {
        match &self.config.sender {
            SenderSelection::Address(addr) => Ok(*addr),
            SenderSelection::Index(i) => {
                let accounts = self.contract.accounts().await?;
                accounts.get(*i).copied().ok_or(BookingError::NoAccount)
            }
        }
    }
}
