//! Core event/action model for the witness sentinel.
//!
//! This crate provides the contract between the failover state machine and
//! its runner:
//!
//! - [`Event`]: all possible inputs to the state machine
//! - [`Action`]: all possible outputs from the state machine
//! - [`Report`]: observable tick events forwarded to the sink
//! - [`StateMachine`]: the trait the failover logic implements
//!
//! # Architecture
//!
//! The core is built on a simple event-driven model:
//!
//! ```text
//! Events → StateMachine::handle() → Actions
//! ```
//!
//! The state machine is:
//! - **Synchronous**: No async, no .await
//! - **Deterministic**: Same state + event = same actions
//! - **Pure-ish**: Mutates self, but performs no I/O
//!
//! All I/O is handled by the runner, which:
//! 1. Fetches witness status and delivers events to the state machine
//! 2. Executes the returned actions (submission, confirmation delay)
//! 3. Converts action results back into events

mod action;
mod event;
mod report;
mod traits;

pub use action::Action;
pub use event::Event;
pub use report::Report;
pub use traits::StateMachine;
