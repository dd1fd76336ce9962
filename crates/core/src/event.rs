//! Event types for the failover state machine.

use sentinel_types::WitnessStatus;

/// All possible inputs to the failover state machine.
///
/// Events are **passive data** - they describe something the runner
/// observed. The state machine processes events and returns actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Fresh witness status sample at the top of a tick.
    StatusObserved { status: WitnessStatus },

    /// The status fetch for this tick failed.
    ///
    /// The tick is abandoned: no counters move and the tick index does not
    /// advance. The next scheduled sample retries.
    StatusFetchFailed { reason: String },

    /// A key-update submission (or its confirmation re-fetch) failed
    /// before the rotation could be confirmed.
    ///
    /// The rotation is re-attempted against the same target key on the
    /// next sample.
    RotationSubmitFailed { reason: String },

    /// Witness status re-fetched after the confirmation delay of a
    /// submitted key update.
    RotationOutcome { status: WitnessStatus },
}
