//! Run status polling configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest wait `validate` accepts for a single run
pub const MAX_POLL_TIMEOUT_SECS: u64 = 3600;
/// Longest delay `validate` accepts between two status checks
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;
pub const MAX_BACKOFF_FACTOR: f64 = 10.0;

/// Backoff schedule used while waiting for a run to finish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub backoff_factor: f64,
    pub timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 500,
            max_interval_ms: 4000,
            backoff_factor: 1.5,
            timeout_secs: 120,
        }
    }
}

impl PollingConfig {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
