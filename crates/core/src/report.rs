//! Observable per-tick reports.

use sentinel_types::SigningKey;

/// Structured events emitted for the observability sink.
///
/// The state machine never performs I/O; the runner turns these into log
/// lines, Prometheus metrics and status-endpoint state. The machine does
/// not depend on the sink's formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Emitted on every successful sample: the per-tick status line.
    Sampled {
        /// Tick index of this sample (monotonic since process start).
        sample: u64,
        /// Witness's lifetime missed-block counter.
        total_missed: u64,
        /// Tick at which the most recent genuine miss was recorded.
        tick_of_last_miss: u64,
        /// Truncated active signing key.
        active_key_prefix: String,
    },

    /// A genuine new miss was recorded this tick.
    MissedBlock {
        /// Misses accumulated since the epoch baseline.
        delta: u64,
        total_missed: u64,
    },

    /// The miss delta crossed the flip threshold; a rotation to `key` is
    /// being submitted.
    RotationTriggered { key: SigningKey },

    /// Rotation confirmed: the on-chain signing key now equals `key`.
    Rotated { key: SigningKey },

    /// Rotation submitted but the on-chain key did not change after the
    /// confirmation delay; the same key will be retried next sample.
    RetryScheduled { key: SigningKey },

    /// The status fetch failed; no counters were touched.
    FetchFailed { reason: String },

    /// The key-update submission failed; the rotation retries next sample.
    SubmitFailed { reason: String },

    /// The quiet period elapsed with no new misses; the next sample starts
    /// a fresh epoch, forgiving old misses.
    EpochReset { quiet_ticks: u64 },
}
