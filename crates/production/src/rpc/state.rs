//! Shared state types for RPC handlers.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Shared state for RPC handlers.
#[derive(Clone)]
pub struct RpcState {
    /// Ready flag for readiness probe.
    pub ready: Arc<AtomicBool>,
    /// Monitor status provider, updated by the runner each tick.
    pub status: Arc<RwLock<MonitorStatusState>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

/// Monitor status published by the runner after every tick.
#[derive(Debug, Clone, Default)]
pub struct MonitorStatusState {
    /// Witness account being monitored.
    pub witness: String,
    /// Samples processed since process start.
    pub samples: u64,
    /// Witness lifetime missed-block counter from the last sample.
    pub total_missed: u64,
    /// Tick of the most recent genuine miss.
    pub tick_of_last_miss: u64,
    /// Prefix of the key the witness currently signs with.
    pub active_key_prefix: String,
    /// Confirmed key rotations since process start.
    pub rotations: u64,
    /// Rotations that did not confirm and were rescheduled.
    pub rotation_retries: u64,
    /// Whether an unconfirmed rotation awaits retry.
    pub retry_pending: bool,
    /// Miss delta reported by the most recent genuine miss.
    pub last_miss_delta: Option<u64>,
}
