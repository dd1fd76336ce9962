//! Production metrics using the native Prometheus client.
//!
//! Metrics are domain-specific rather than generic event counters; use
//! traces for tick-level granularity during investigations.

use prometheus::{register_counter, register_gauge, Counter, Gauge};
use std::sync::OnceLock;

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Domain-specific metrics for the witness monitor.
pub struct Metrics {
    // === Sampling ===
    pub samples_total: Counter,
    pub fetch_failures_total: Counter,
    pub witness_total_missed: Gauge,
    pub ticks_since_last_miss: Gauge,

    // === Misses ===
    pub missed_blocks_total: Counter,
    pub epoch_resets_total: Counter,

    // === Rotation ===
    pub rotation_attempts_total: Counter,
    pub rotations_total: Counter,
    pub rotation_retries_total: Counter,
    pub submit_failures_total: Counter,
    pub rotation_retry_pending: Gauge,
}

impl Metrics {
    fn new() -> Self {
        Self {
            samples_total: register_counter!(
                "sentinel_samples_total",
                "Total witness status samples taken"
            )
            .unwrap(),

            fetch_failures_total: register_counter!(
                "sentinel_fetch_failures_total",
                "Status fetches that failed and aborted their tick"
            )
            .unwrap(),

            witness_total_missed: register_gauge!(
                "sentinel_witness_total_missed",
                "Witness lifetime missed-block counter"
            )
            .unwrap(),

            ticks_since_last_miss: register_gauge!(
                "sentinel_ticks_since_last_miss",
                "Ticks elapsed since the most recent genuine miss"
            )
            .unwrap(),

            missed_blocks_total: register_counter!(
                "sentinel_missed_blocks_total",
                "Genuine new misses recorded"
            )
            .unwrap(),

            epoch_resets_total: register_counter!(
                "sentinel_epoch_resets_total",
                "Baseline resets after a quiet period"
            )
            .unwrap(),

            rotation_attempts_total: register_counter!(
                "sentinel_rotation_attempts_total",
                "Key rotations submitted (including retries)"
            )
            .unwrap(),

            rotations_total: register_counter!(
                "sentinel_rotations_total",
                "Key rotations confirmed on-chain"
            )
            .unwrap(),

            rotation_retries_total: register_counter!(
                "sentinel_rotation_retries_total",
                "Rotations left unconfirmed and scheduled for retry"
            )
            .unwrap(),

            submit_failures_total: register_counter!(
                "sentinel_submit_failures_total",
                "Key-update submissions that failed before confirmation"
            )
            .unwrap(),

            rotation_retry_pending: register_gauge!(
                "sentinel_rotation_retry_pending",
                "1 when an unconfirmed rotation awaits retry"
            )
            .unwrap(),
        }
    }
}

/// Global metrics accessor. Registers on first use.
pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}

/// Record one successful sample.
pub fn record_sample(total_missed: u64, ticks_since_last_miss: u64) {
    let m = metrics();
    m.samples_total.inc();
    m.witness_total_missed.set(total_missed as f64);
    m.ticks_since_last_miss.set(ticks_since_last_miss as f64);
}

/// Record a failed status fetch.
pub fn record_fetch_failure() {
    metrics().fetch_failures_total.inc();
}

/// Record a genuine new miss.
pub fn record_missed_block() {
    metrics().missed_blocks_total.inc();
}

/// Record a quiet-period baseline reset.
pub fn record_epoch_reset() {
    metrics().epoch_resets_total.inc();
}

/// Record a rotation submission.
pub fn record_rotation_attempt() {
    metrics().rotation_attempts_total.inc();
}

/// Record a confirmed rotation.
pub fn record_rotation() {
    let m = metrics();
    m.rotations_total.inc();
    m.rotation_retry_pending.set(0.0);
}

/// Record an unconfirmed rotation scheduled for retry.
pub fn record_rotation_retry() {
    let m = metrics();
    m.rotation_retries_total.inc();
    m.rotation_retry_pending.set(1.0);
}

/// Record a failed key-update submission.
pub fn record_submit_failure() {
    let m = metrics();
    m.submit_failures_total.inc();
    m.rotation_retry_pending.set(1.0);
}
