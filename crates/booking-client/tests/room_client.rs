use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use booking_client::{ClientConfig, ConfirmationPolicy, RoomLedgerClient, SenderSelection};
use booking_codec::utf8_to_hex;
use booking_core::{Address, BookingError, BookingResult, RawRoom, RoomId, Slot, TxHash, TxReceipt};
use booking_hal::{BookingContract, FixedClock};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Accounts,
    ListRooms,
    GetRoom(RoomId, u64),
    SetSlots(Address, RoomId, Vec<String>),
    SetRoom(Address, RoomId, u64),
    Receipt(TxHash),
}

#[derive(Default)]
struct MockLedger {
    accounts: Vec<Address>,
    rooms: Vec<RoomId>,
    room: RawRoom,
    read_error: Option<BookingError>,
    write_error: Option<BookingError>,
    receipts: Mutex<Vec<Option<TxReceipt>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockLedger {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn read(&self) -> BookingResult<()> {
        self.read_error.clone().map_or(Ok(()), Err)
    }

    fn write(&self) -> BookingResult<()> {
        self.write_error.clone().map_or(Ok(()), Err)
    }
}

struct Handle(Arc<MockLedger>);

#[async_trait]
impl BookingContract for Handle {
    async fn accounts(&self) -> BookingResult<Vec<Address>> {
        self.0.record(Call::Accounts);
        Ok(self.0.accounts.clone())
    }
    async fn list_rooms(&self) -> BookingResult<Vec<RoomId>> {
        self.0.record(Call::ListRooms);
        self.0.read()?;
        Ok(self.0.rooms.clone())
    }
    async fn get_room(&self, id: RoomId, timestamp: u64) -> BookingResult<RawRoom> {
        self.0.record(Call::GetRoom(id, timestamp));
        self.0.read()?;
        Ok(self.0.room.clone())
    }
    async fn set_slots(&self, from: &Address, room_id: RoomId, data: Vec<String>) -> BookingResult<TxHash> {
        self.0.record(Call::SetSlots(*from, room_id, data));
        self.0.write()?;
        Ok(TxHash("0xabc".into()))
    }
    async fn set_room(&self, from: &Address, room_id: RoomId, capacity: u64) -> BookingResult<TxHash> {
        self.0.record(Call::SetRoom(*from, room_id, capacity));
        self.0.write()?;
        Ok(TxHash("0xdef".into()))
    }
    async fn receipt(&self, tx: &TxHash) -> BookingResult<Option<TxReceipt>> {
        self.0.record(Call::Receipt(tx.clone()));
        let mut queue = self.0.receipts.lock().unwrap();
        if queue.is_empty() {
            Ok(None)
        } else {
            Ok(queue.remove(0))
        }
    }
}

const NOW: u64 = 1_700_000_000;

fn account(last: u8) -> Address {
    Address::with_last_byte(last)
}

fn client_with(ledger: MockLedger, config: ClientConfig) -> (RoomLedgerClient, Arc<MockLedger>) {
    let ledger = Arc::new(ledger);
    let client = RoomLedgerClient::new(Box::new(Handle(ledger.clone())), Box::new(FixedClock(NOW)), config);
    (client, ledger)
}

fn client(ledger: MockLedger) -> (RoomLedgerClient, Arc<MockLedger>) {
    client_with(ledger, ClientConfig::default())
}

#[tokio::test]
async fn test_get_room_pairs_status_with_data() {
    let (client, ledger) = client(MockLedger {
        room: RawRoom {
            capacity: 12,
            status: vec![0, 1],
            data: vec![utf8_to_hex("a"), utf8_to_hex("b")],
        },
        ..Default::default()
    });

    let room = client.get_room(5, None).await.unwrap();

    assert_eq!(room.id, 5);
    assert_eq!(room.capacity, 12);
    assert_eq!(
        room.slots,
        vec![
            Slot { id: 0, status: 0, data: "a".into() },
            Slot { id: 1, status: 1, data: "b".into() },
        ]
    );
    assert_eq!(ledger.calls(), vec![Call::GetRoom(5, NOW)]);
}

#[tokio::test]
async fn test_get_room_keeps_empty_slots() {
    let (client, _) = client(MockLedger {
        room: RawRoom {
            capacity: 1,
            status: vec![0, 2, 0],
            data: vec!["0x00".into(), utf8_to_hex("x"), "0x".into()],
        },
        ..Default::default()
    });

    let room = client.get_room(1, Some(42)).await.unwrap();
    let data: Vec<_> = room.slots.iter().map(|s| s.data.as_str()).collect();
    assert_eq!(data, vec!["", "x", ""]);
}

#[tokio::test]
async fn test_get_room_explicit_timestamp() {
    let (client, ledger) = client(MockLedger::default());
    client.get_room(9, Some(1234)).await.unwrap();
    assert_eq!(ledger.calls(), vec![Call::GetRoom(9, 1234)]);
}

#[tokio::test]
async fn test_get_room_length_mismatch_fails() {
    let (client, _) = client(MockLedger {
        room: RawRoom {
            capacity: 1,
            status: vec![0, 1],
            data: vec![utf8_to_hex("a")],
        },
        ..Default::default()
    });

    assert!(matches!(client.get_room(5, None).await, Err(BookingError::Decode(_))));
}

#[tokio::test]
async fn test_get_room_bad_payload_fails() {
    let (client, _) = client(MockLedger {
        room: RawRoom {
            capacity: 1,
            status: vec![0],
            data: vec!["0xff".into()],
        },
        ..Default::default()
    });

    assert!(matches!(client.get_room(5, None).await, Err(BookingError::Decode(_))));
}

#[tokio::test]
async fn test_list_rooms_preserves_order_and_duplicates() {
    let (client, _) = client(MockLedger {
        rooms: vec![7, 3, 7, 1],
        ..Default::default()
    });
    assert_eq!(client.list_rooms_ids().await.unwrap(), vec![7, 3, 7, 1]);
}

#[tokio::test]
async fn test_set_slots_non_array_is_noop() {
    let (client, ledger) = client(MockLedger {
        accounts: vec![account(1)],
        ..Default::default()
    });

    for arg in [json!("slots"), json!(3), json!(null), json!({ "data": "a" })] {
        assert_eq!(client.set_slots_value(4, &arg).await.unwrap(), None);
    }
    assert!(ledger.calls().is_empty(), "non-array argument reached the ledger");
}

#[tokio::test]
async fn test_set_slots_empty_data_sends_placeholder() {
    let (client, ledger) = client(MockLedger {
        accounts: vec![account(1), account(2)],
        ..Default::default()
    });

    let tx = client.set_slots_value(4, &json!([{ "id": 0, "status": 0, "data": "" }])).await.unwrap();

    assert_eq!(tx, Some(TxHash("0xabc".into())));
    assert_eq!(
        ledger.calls(),
        vec![Call::Accounts, Call::SetSlots(account(1), 4, vec!["0x00".into()])]
    );
}

#[tokio::test]
async fn test_set_slots_missing_data_is_rejected() {
    let (client, ledger) = client(MockLedger {
        accounts: vec![account(1)],
        ..Default::default()
    });

    let res = client.set_slots_value(4, &json!([{ "status": 1 }])).await;
    assert!(matches!(res, Err(BookingError::InvalidArgument(_))));
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn test_set_slots_typed() {
    let (client, ledger) = client(MockLedger {
        accounts: vec![account(1)],
        ..Default::default()
    });

    let slots = vec![
        Slot { id: 0, status: 1, data: "a".into() },
        Slot { id: 1, status: 0, data: "".into() },
    ];
    client.set_slots(2, &slots).await.unwrap();

    assert_eq!(
        ledger.calls()[1],
        Call::SetSlots(account(1), 2, vec!["0x61".into(), "0x00".into()])
    );
}

#[tokio::test]
async fn test_set_room_uses_configured_sender() {
    let (client, ledger) = client_with(
        MockLedger {
            accounts: vec![account(1), account(2)],
            ..Default::default()
        },
        ClientConfig { sender: SenderSelection::Index(1) },
    );

    client.set_room(8, 20).await.unwrap();
    assert_eq!(ledger.calls(), vec![Call::Accounts, Call::SetRoom(account(2), 8, 20)]);
}

#[tokio::test]
async fn test_explicit_sender_address_skips_account_lookup() {
    let (client, ledger) = client_with(
        MockLedger::default(),
        ClientConfig { sender: SenderSelection::Address(account(9)) },
    );

    client.set_room(8, 20).await.unwrap();
    assert_eq!(ledger.calls(), vec![Call::SetRoom(account(9), 8, 20)]);
}

#[tokio::test]
async fn test_no_account_available() {
    let (client, ledger) = client(MockLedger::default());

    assert_eq!(client.set_room(1, 1).await, Err(BookingError::NoAccount));
    assert_eq!(ledger.calls(), vec![Call::Accounts]);
}

#[tokio::test(start_paused = true)]
async fn test_await_confirmation_polls_until_mined() {
    let tx = TxHash("0xabc".into());
    let mined = TxReceipt { tx_hash: tx.clone(), block_number: 77, success: true };
    let (client, ledger) = client(MockLedger {
        receipts: Mutex::new(vec![None, None, Some(mined.clone())]),
        ..Default::default()
    });

    let policy = ConfirmationPolicy::new(5, Duration::from_millis(100));
    assert_eq!(client.await_confirmation(&tx, policy).await.unwrap(), mined);
    assert_eq!(ledger.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_await_confirmation_reports_revert_and_timeout() {
    let tx = TxHash("0xabc".into());
    let reverted = TxReceipt { tx_hash: tx.clone(), block_number: 3, success: false };
    let (client, _) = client(MockLedger {
        receipts: Mutex::new(vec![Some(reverted)]),
        ..Default::default()
    });
    let policy = ConfirmationPolicy::new(2, Duration::from_millis(10));

    assert_eq!(client.await_confirmation(&tx, policy).await, Err(BookingError::Reverted(tx.clone())));
    assert_eq!(client.await_confirmation(&tx, policy).await, Err(BookingError::Unconfirmed(tx.clone())));
}

#[tokio::test]
async fn test_read_errors_pass_through_unchanged() {
    let failure = BookingError::Query("execution reverted".into());
    let (client, ledger) = client(MockLedger {
        read_error: Some(failure.clone()),
        ..Default::default()
    });

    assert_eq!(client.list_rooms_ids().await, Err(failure.clone()));
    assert_eq!(client.get_room(3, Some(10)).await, Err(failure));
    assert_eq!(ledger.calls(), vec![Call::ListRooms, Call::GetRoom(3, 10)]);
}

#[tokio::test]
async fn test_write_errors_pass_through_unchanged() {
    let failure = BookingError::Submission("insufficient funds".into());
    let (client, ledger) = client(MockLedger {
        accounts: vec![account(1)],
        write_error: Some(failure.clone()),
        ..Default::default()
    });

    let slots = [Slot { id: 0, status: 1, data: "a".into() }];
    assert_eq!(client.set_slots(2, &slots).await, Err(failure.clone()));
    assert_eq!(client.set_room(2, 4).await, Err(failure.clone()));
    assert_eq!(
        client.set_slots_value(2, &json!([{ "data": "b" }])).await,
        Err(failure)
    );
    assert_eq!(
        ledger.calls(),
        vec![
            Call::Accounts,
            Call::SetSlots(account(1), 2, vec!["0x61".into()]),
            Call::Accounts,
            Call::SetRoom(account(1), 2, 4),
            Call::Accounts,
            Call::SetSlots(account(1), 2, vec!["0x62".into()]),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_zero_attempt_policy_still_polls_once() {
    let tx = TxHash("0xabc".into());
    let mined = TxReceipt { tx_hash: tx.clone(), block_number: 5, success: true };
    let (client, ledger) = client(MockLedger {
        receipts: Mutex::new(vec![Some(mined.clone())]),
        ..Default::default()
    });

    let policy = ConfirmationPolicy::new(0, Duration::from_millis(10));
    assert_eq!(policy.max_attempts(), 1);
    assert_eq!(client.await_confirmation(&tx, policy).await.unwrap(), mined);
    assert_eq!(ledger.calls(), vec![Call::Receipt(tx)]);
}
