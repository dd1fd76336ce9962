//! Foundation types for the witness sentinel.
//!
//! This crate provides the types shared across the monitor:
//!
//! - **Identifiers**: [`WitnessName`], [`SigningKey`]
//! - **Chain status**: [`WitnessStatus`], re-fetched fresh every sample
//! - **Failover data**: [`KeyRing`], the ordered cyclic list of backup
//!   signing keys, and [`MissCounter`], the tagged missed-block watermark
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not
//! depend on any other workspace crates, making it the foundation layer.

mod key_ring;
mod keys;
mod miss_counter;
mod status;

pub use key_ring::{KeyRing, KeyRingError};
pub use keys::{SigningKey, WitnessName};
pub use miss_counter::MissCounter;
pub use status::WitnessStatus;
