//! Action types for the failover state machine.

use crate::Report;
use sentinel_types::SigningKey;
use std::time::Duration;

/// Actions the state machine wants the runner to perform.
///
/// Actions are **commands** - they describe something to do. The runner
/// executes actions and converts results back into events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Submit an update-witness transaction switching the signing key to
    /// `key`, wait `confirm_after` for the chain to apply it, re-fetch the
    /// witness status and deliver [`Event::RotationOutcome`].
    ///
    /// `confirm_after` is sized to at least two block-production intervals
    /// so the chain has had a chance to apply the change.
    ///
    /// [`Event::RotationOutcome`]: crate::Event::RotationOutcome
    SubmitKeyUpdate {
        key: SigningKey,
        confirm_after: Duration,
    },

    /// Forward an observable report to the logging/metrics sink.
    Report(Report),
}
