mod booking;
mod manager;

use std::env;
use std::time::Duration;

pub use booking::{BookingConfirmation, BookingDesk};
pub use manager::{ActionOutcome, ConversationManager};

const DEFAULT_REPLY_DELAY_MS: u64 = 1000;
const DEFAULT_DETAIL_DELAY_MS: u64 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationConfig {
    /// Simulated typing latency before a free-text reply is appended.
    pub reply_delay: Duration,
    /// Shorter latency for replies triggered by service buttons.
    pub detail_delay: Duration,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
            detail_delay: Duration::from_millis(DEFAULT_DETAIL_DELAY_MS),
        }
    }
}

impl ConversationConfig {
    pub fn from_env() -> Self {
        Self {
            reply_delay: Duration::from_millis(millis_from_env(
                "LEADDEV_REPLY_DELAY_MS",
                DEFAULT_REPLY_DELAY_MS,
            )),
            detail_delay: Duration::from_millis(millis_from_env(
                "LEADDEV_DETAIL_DELAY_MS",
                DEFAULT_DETAIL_DELAY_MS,
            )),
        }
    }
}

fn millis_from_env(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
