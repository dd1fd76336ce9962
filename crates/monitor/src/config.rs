//! Monitor configuration.

use std::time::Duration;

/// Configuration for the failover state machine.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Misses accumulated since the epoch baseline before the signing key
    /// is rotated.
    pub flip_threshold: u64,

    /// Miss-free ticks before the baseline is forgiven and the next sample
    /// starts a fresh epoch.
    pub reset_threshold: u64,

    /// How long to wait after submitting a key update before re-fetching
    /// status to confirm it. Must cover at least two block-production
    /// intervals.
    pub confirm_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            flip_threshold: 3,
            reset_threshold: 240,
            confirm_delay: Duration::from_secs(6),
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flip_threshold(mut self, misses: u64) -> Self {
        self.flip_threshold = misses;
        self
    }

    pub fn with_reset_threshold(mut self, ticks: u64) -> Self {
        self.reset_threshold = ticks;
        self
    }

    pub fn with_confirm_delay(mut self, delay: Duration) -> Self {
        self.confirm_delay = delay;
        self
    }
}
