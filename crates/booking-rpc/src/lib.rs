#![forbid(unsafe_code)]

//! JSON-RPC ledger backend for the Booking contract.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::info;

use booking_core::{BookingError, BookingResult};
use booking_hal::PlatformClock;

pub mod artifact;
pub mod contract;
pub mod transport;

pub use artifact::{Artifact, BookingInterface};
pub use contract::RpcContract;
pub use transport::{HttpTransport, RpcError, Transport};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8545";

#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub gas: Option<u64>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            gas: None,
        }
    }
}

/// Opens an HTTP transport and binds the contract at `address`.
/// Nothing is sent to the node until the first call.
pub fn connect(config: &RpcConfig, artifact_path: &Path, address: &str) -> BookingResult<RpcContract<HttpTransport>> {
    let artifact = Artifact::load(artifact_path)?;
    let transport = HttpTransport::new(&config.endpoint, config.timeout)
        .map_err(|e| BookingError::Connection(e.to_string()))?;
    let contract = RpcContract::bind(transport, &artifact, address)?.with_gas(config.gas);
    info!("[RPC] Booking contract {} via {}", contract.address(), config.endpoint);
    Ok(contract)
}

pub struct SystemClock;

impl PlatformClock for SystemClock {
    fn unix_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
