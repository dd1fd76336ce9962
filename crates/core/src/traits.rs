//! State machine trait.

use crate::{Action, Event};

/// A deterministic state machine: events in, actions out.
///
/// Implementations are synchronous and perform no I/O. The runner owns all
/// networking, timing and logging, which keeps the transition function
/// testable without wall-clock sleeps or a live chain.
pub trait StateMachine {
    /// Process one event and return the actions it produces.
    fn handle(&mut self, event: Event) -> Vec<Action>;
}
