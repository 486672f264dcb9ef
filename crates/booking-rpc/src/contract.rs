use alloy_dyn_abi::DynSolValue;
use alloy_primitives::B256;
use async_trait::async_trait;
use log::debug;
use serde_json::{json, Map, Value};

use booking_codec::{from_hex, to_hex};
use booking_core::{Address, BookingError, BookingResult, RawRoom, RoomId, TxHash, TxReceipt};
use booking_hal::BookingContract;

use crate::artifact::{Artifact, BookingInterface, Method, SlotPayload};
use crate::transport::{RpcError, Transport};

/// The Booking contract reached through `eth_*` JSON-RPC calls.
/// Transactions are signed by the node (`eth_sendTransaction`).
pub struct RpcContract<T> {
    transport: T,
    address: Address,
    interface: BookingInterface,
    gas: Option<u64>,
}

fn query_err(e: RpcError) -> BookingError {
    BookingError::Query(e.to_string())
}

fn quantity(v: u64) -> String {
    format!("0x{v:x}")
}

fn parse_quantity(v: &Value) -> BookingResult<u64> {
    let s = v
        .as_str()
        .ok_or_else(|| BookingError::Decode(format!("expected hex quantity, got {v}")))?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| BookingError::Decode(format!("quantity {s}: {e}")))
}

fn as_u64(v: &DynSolValue, what: &str) -> BookingResult<u64> {
    match v {
        DynSolValue::Uint(n, _) => {
            u64::try_from(*n).map_err(|_| BookingError::Decode(format!("{what} does not fit in 64 bits")))
        }
        _ => Err(BookingError::Decode(format!("{what} is not an integer"))),
    }
}

fn as_list<'a>(v: &'a DynSolValue, what: &str) -> BookingResult<&'a [DynSolValue]> {
    match v {
        DynSolValue::Array(items) => Ok(items),
        _ => Err(BookingError::Decode(format!("{what} is not an array"))),
    }
}

/// Hex of one slot payload. Fixed-size payloads keep their NUL padding.
fn payload_hex(v: &DynSolValue) -> BookingResult<String> {
    match v {
        DynSolValue::Bytes(b) => Ok(to_hex(b)),
        DynSolValue::FixedBytes(word, size) => Ok(to_hex(&word[..*size])),
        _ => Err(BookingError::Decode("data holds a non-bytes entry".into())),
    }
}

fn payload_value(kind: SlotPayload, hex: &str) -> BookingResult<DynSolValue> {
    let bytes = from_hex(hex).map_err(|e| BookingError::InvalidArgument(e.to_string()))?;
    match kind {
        SlotPayload::Dynamic => Ok(DynSolValue::Bytes(bytes)),
        SlotPayload::Fixed(size) if bytes.len() <= size => {
            Ok(DynSolValue::FixedBytes(B256::right_padding_from(&bytes), size))
        }
        SlotPayload::Fixed(size) => Err(BookingError::InvalidArgument(format!(
            "slot payload {hex} is longer than {size} bytes"
        ))),
    }
}

impl<T: Transport> RpcContract<T> {
    /// Binds `address` to the Booking interface found in `artifact`.
    pub fn bind(transport: T, artifact: &Artifact, address: &str) -> BookingResult<Self> {
        let address: Address = address
            .parse()
            .map_err(|e| BookingError::Connection(format!("contract address {address}: {e}")))?;
        let interface = BookingInterface::bind(artifact)?;
        Ok(Self { transport, address, interface, gas: None })
    }

    /// Gas limit attached to writes. Left to the node when unset.
    pub fn with_gas(mut self, gas: Option<u64>) -> Self {
        self.gas = gas;
        self
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    async fn call(&self, m: &Method, args: &[DynSolValue]) -> BookingResult<Vec<DynSolValue>> {
        let tx = json!({
            "to": self.address.to_string(),
            "data": to_hex(&m.encode_call(args)?),
        });
        let result = self
            .transport
            .request("eth_call", json!([tx, "latest"]))
            .await
            .map_err(query_err)?;

        let raw = result
            .as_str()
            .ok_or_else(|| BookingError::Decode(format!("{}: eth_call result is not a string", m.function.name)))?;
        m.decode_output(&from_hex(raw)?)
    }

    async fn send(&self, from: &Address, m: &Method, args: &[DynSolValue]) -> BookingResult<TxHash> {
        let mut tx = Map::new();
        tx.insert("from".into(), Value::String(from.to_string()));
        tx.insert("to".into(), Value::String(self.address.to_string()));
        tx.insert("data".into(), Value::String(to_hex(&m.encode_call(args)?)));
        if let Some(gas) = self.gas {
            tx.insert("gas".into(), Value::String(quantity(gas)));
        }

        let result = self
            .transport
            .request("eth_sendTransaction", json!([Value::Object(tx)]))
            .await
            .map_err(|e| BookingError::Submission(format!("{}: {e}", m.function.name)))?;

        match result {
            Value::String(hash) => Ok(TxHash(hash)),
            other => Err(BookingError::Decode(format!("transaction hash expected, got {other}"))),
        }
    }
}

#[async_trait]
impl<T: Transport> BookingContract for RpcContract<T> {
    async fn accounts(&self) -> BookingResult<Vec<Address>> {
        let result = self.transport.request("eth_accounts", json!([])).await.map_err(query_err)?;
        let list = result
            .as_array()
            .ok_or_else(|| BookingError::Decode("eth_accounts result is not an array".into()))?;
        list.iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| BookingError::Decode(format!("account {v} is not a string")))?
                    .parse::<Address>()
                    .map_err(|e| BookingError::Decode(format!("account {v}: {e}")))
            })
            .collect()
    }

    async fn list_rooms(&self) -> BookingResult<Vec<RoomId>> {
        let out = self.call(&self.interface.list_rooms, &[]).await?;
        let ids = out.first().ok_or_else(|| BookingError::Decode("listRooms returned nothing".into()))?;
        as_list(ids, "room ids")?.iter().map(|v| as_u64(v, "room id")).collect()
    }

    async fn get_room(&self, id: RoomId, timestamp: u64) -> BookingResult<RawRoom> {
        let m = &self.interface.get_room;
        let args = [m.uint_arg(0, id), m.uint_arg(1, timestamp)];
        let out = self.call(m, &args).await?;
        let layout = self.interface.room_layout;

        let capacity = as_u64(&out[layout.capacity], "capacity")?;
        let status = as_list(&out[layout.status], "status")?
            .iter()
            .map(|v| as_u64(v, "status"))
            .collect::<BookingResult<Vec<_>>>()?;
        let data = as_list(&out[layout.data], "data")?
            .iter()
            .map(payload_hex)
            .collect::<BookingResult<Vec<_>>>()?;

        debug!("[RPC] getRoom({id}, {timestamp}): capacity {capacity}, {} slots", status.len());
        Ok(RawRoom { capacity, status, data })
    }

    async fn set_slots(&self, from: &Address, room_id: RoomId, data: Vec<String>) -> BookingResult<TxHash> {
        let m = &self.interface.set_slots;
        let payloads = data
            .iter()
            .map(|hex| payload_value(self.interface.slot_payload, hex))
            .collect::<BookingResult<Vec<_>>>()?;
        let args = [m.uint_arg(0, room_id), DynSolValue::Array(payloads)];
        self.send(from, m, &args).await
    }

    async fn set_room(&self, from: &Address, room_id: RoomId, capacity: u64) -> BookingResult<TxHash> {
        let m = &self.interface.set_room;
        let args = [m.uint_arg(0, room_id), m.uint_arg(1, capacity)];
        self.send(from, m, &args).await
    }

    async fn receipt(&self, tx: &TxHash) -> BookingResult<Option<TxReceipt>> {
        let result = self
            .transport
            .request("eth_getTransactionReceipt", json!([tx.0]))
            .await
            .map_err(query_err)?;

        if result.is_null() {
            return Ok(None);
        }
        let receipt = result
            .as_object()
            .ok_or_else(|| BookingError::Decode(format!("receipt for {tx} is not an object: {result}")))?;
        let block_number = match receipt.get("blockNumber") {
            None | Some(Value::Null) => return Ok(None),
            Some(v) => parse_quantity(v)?,
        };
        // Receipts from before status codes existed carry no `status`.
        let success = match receipt.get("status") {
            None | Some(Value::Null) => true,
            Some(v) => parse_quantity(v)? == 1,
        };
        Ok(Some(TxReceipt { tx_hash: tx.clone(), block_number, success }))
    }
}
