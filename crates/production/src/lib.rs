//! Production runner with async I/O.
//!
//! This crate wraps the deterministic failover state machine with real
//! async I/O:
//!
//! - Witness status fetched over wallet JSON-RPC (with endpoint failover)
//! - Key updates submitted through the same wallet connection
//! - Fixed-interval sampling via tokio sleeps, measured from end of tick
//! - Prometheus metrics and an axum status/health server
//!
//! # Architecture
//!
//! A single task owns the state machine and drives one tick at a time:
//!
//! ```text
//! loop {
//!     status  = reader.witness_status();         // I/O
//!     actions = state.handle(StatusObserved);    // pure
//!     execute(actions);                          // I/O, may feed back
//!     sleep(sample_interval);
//! }
//! ```
//!
//! Ticks never overlap: a rotation's submit/confirm sequence runs to
//! completion inside its tick before the next sleep begins.

pub mod chain;
pub mod metrics;
pub mod rpc;
mod runner;

pub use runner::{MonitorRunner, ShutdownHandle};
