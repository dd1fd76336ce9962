//! Request and response types for the RPC API.

use serde::{Deserialize, Serialize};

/// Response for `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Response for `/ready` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub ready: bool,
}

/// Response for `/api/v1/status` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatusResponse {
    /// Witness account being monitored.
    pub witness: String,
    /// Samples processed since process start.
    pub samples: u64,
    /// Witness lifetime missed-block counter.
    pub total_missed: u64,
    /// Ticks elapsed since the most recent genuine miss.
    pub ticks_since_last_miss: u64,
    /// Miss delta from the most recent genuine miss, if any.
    pub last_miss_delta: Option<u64>,
    /// Prefix of the key the witness currently signs with.
    pub active_key_prefix: String,
    /// Confirmed key rotations since process start.
    pub rotations: u64,
    /// Rotations that did not confirm and were rescheduled.
    pub rotation_retries: u64,
    /// Whether an unconfirmed rotation awaits retry.
    pub retry_pending: bool,
    /// Daemon uptime in seconds.
    pub uptime_secs: u64,
    /// Version string.
    pub version: String,
}
