use std::time::Duration;

use booking_core::Address;

/// Which node account signs write transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderSelection {
    /// Position in the node's `accounts` list.
    Index(usize),
    Address(Address),
}

impl Default for SenderSelection {
    fn default() -> Self {
        SenderSelection::Index(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub sender: SenderSelection,
}

/// Receipt polling schedule for `await_confirmation`.
/// Always polls at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    max_attempts: u32,
    poll_interval: Duration,
}

impl ConfirmationPolicy {
    pub fn new(max_attempts: u32, poll_interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            poll_interval,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(1))
    }
}
