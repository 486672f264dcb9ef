use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{info, warn};

use booking_client::{ClientConfig, ConfirmationPolicy, RoomLedgerClient, SenderSelection};
use booking_core::{Address, Room, RoomId, Slot, TxHash};
use booking_rpc::{RpcConfig, SystemClock};

#[derive(Parser)]
#[command(name = "booking", about = "Read and write room bookings on the ledger")]
struct Cli {
    #[arg(long, env = "BOOKING_RPC_URL", default_value = booking_rpc::DEFAULT_ENDPOINT)]
    rpc_url: String,
    #[arg(long, env = "BOOKING_ARTIFACT", default_value = "build/contracts/Booking.json")]
    artifact: PathBuf,
    #[arg(long, env = "BOOKING_ADDRESS")]
    address: String,
    /// Sender position in the node's account list.
    #[arg(long, env = "BOOKING_ACCOUNT_INDEX", default_value_t = 0)]
    account_index: usize,
    /// Explicit sender address. Overrides --account-index.
    #[arg(long, env = "BOOKING_FROM")]
    from: Option<String>,
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    #[arg(long)]
    gas: Option<u64>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List room ids.
    Rooms,
    /// Show one room.
    Room {
        id: RoomId,
        /// Unix seconds; defaults to now.
        #[arg(long)]
        at: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Set a room's capacity.
    SetRoom {
        id: RoomId,
        capacity: u64,
        #[arg(long)]
        wait: bool,
    },
    /// Replace a room's slot payloads.
    SetSlots {
        id: RoomId,
        /// One payload per slot, in order.
        data: Vec<String>,
        /// JSON slot array as produced by `room --json`.
        #[arg(long, conflicts_with = "data")]
        file: Option<PathBuf>,
        #[arg(long)]
        wait: bool,
    },
}

fn print_room(room: &Room) {
    println!("{} {}  capacity {}", "Room".bold(), room.id, room.capacity);
    for slot in &room.slots {
        let status = if slot.status == 0 {
            slot.status.to_string().green()
        } else {
            slot.status.to_string().yellow()
        };
        println!("  #{:<3} [{}] {}", slot.id, status, slot.data);
    }
}

async fn finish(client: &RoomLedgerClient, tx: TxHash, wait: bool) -> anyhow::Result<()> {
    println!("submitted {}", tx.to_string().cyan());
    if wait {
        let receipt = client.await_confirmation(&tx, ConfirmationPolicy::default()).await?;
        println!("mined in block {}", receipt.block_number.to_string().green());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let rpc = RpcConfig {
        endpoint: cli.rpc_url.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
        gas: cli.gas,
    };
    let contract = booking_rpc::connect(&rpc, &cli.artifact, &cli.address)?;

    let sender = match &cli.from {
        Some(addr) => SenderSelection::Address(addr.parse::<Address>()?),
        None => SenderSelection::Index(cli.account_index),
    };
    let client = RoomLedgerClient::new(Box::new(contract), Box::new(SystemClock), ClientConfig { sender });

    match cli.cmd {
        Command::Rooms => {
            for id in client.list_rooms_ids().await? {
                println!("{id}");
            }
        }
        Command::Room { id, at, json } => {
            let room = client.get_room(id, at).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&room)?);
            } else {
                print_room(&room);
            }
        }
        Command::SetRoom { id, capacity, wait } => {
            let tx = client.set_room(id, capacity).await?;
            finish(&client, tx, wait).await?;
        }
        Command::SetSlots { id, data, file, wait } => {
            let submitted = match file {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    let value: serde_json::Value = serde_json::from_str(&text)
                        .with_context(|| format!("parsing {}", path.display()))?;
                    // `room --json` output carries the slots under "slots".
                    let slots = value.get("slots").unwrap_or(&value);
                    client.set_slots_value(id, slots).await?
                }
                None => {
                    let slots: Vec<Slot> = data
                        .into_iter()
                        .enumerate()
                        .map(|(i, data)| Slot { id: i, status: 0, data })
                        .collect();
                    Some(client.set_slots(id, &slots).await?)
                }
            };

            match submitted {
                Some(tx) => finish(&client, tx, wait).await?,
                None => warn!("slot file holds no slot array; nothing submitted"),
            }
        }
    }

    info!("done");
    Ok(())
}
