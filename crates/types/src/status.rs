//! Per-sample witness status.

use crate::SigningKey;
use serde::{Deserialize, Serialize};

/// Snapshot of a witness's on-chain state.
///
/// Produced fresh on every sample by the chain reader and never cached
/// beyond the tick that fetched it. `total_missed` is the lifetime
/// missed-block counter maintained by the chain; it is monotonically
/// non-decreasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessStatus {
    /// Signing key the witness currently produces blocks with.
    pub signing_key: SigningKey,
    /// Lifetime count of missed block-production slots.
    pub total_missed: u64,
}

impl WitnessStatus {
    pub fn new(signing_key: SigningKey, total_missed: u64) -> Self {
        Self {
            signing_key,
            total_missed,
        }
    }
}
