//! Failover state machine for witness missed-block monitoring.
//!
//! The monitor samples a witness's lifetime missed-block counter on a fixed
//! interval, measures misses against a floating epoch baseline,
//! distinguishes genuine new misses from rotation retries, and rotates the
//! signing key through a backup ring when the miss delta crosses a
//! threshold. Sustained good behavior forgives old misses by resetting the
//! baseline.
//!
//! The state machine here is deterministic and synchronous; the production
//! runner feeds it [`sentinel_core::Event`]s and executes the
//! [`sentinel_core::Action`]s it returns.

mod config;
mod state;

pub use config::MonitorConfig;
pub use state::{FailoverState, MonitorStats};
