//! Tagged missed-block watermark.

/// Missed-block count observed on the previous sample.
///
/// An explicit tagged value instead of an integer with `-1` overloaded as a
/// sentinel. The three states are genuinely distinct:
///
/// - `Unset`: no sample has been recorded for the current epoch yet.
/// - `PendingRetry`: a rotation was submitted but the on-chain signing key
///   did not change; the next sample must retry the rotation against the
///   same target key instead of treating the counter delta as a fresh miss.
/// - `Counted(n)`: the witness's total-missed counter stood at `n` on the
///   previous sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissCounter {
    Unset,
    PendingRetry,
    Counted(u64),
}

impl MissCounter {
    /// The recorded count, if one exists.
    pub fn counted(self) -> Option<u64> {
        match self {
            MissCounter::Counted(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_pending_retry(self) -> bool {
        matches!(self, MissCounter::PendingRetry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counted_extracts_only_recorded_values() {
        assert_eq!(MissCounter::Counted(5).counted(), Some(5));
        assert_eq!(MissCounter::Unset.counted(), None);
        assert_eq!(MissCounter::PendingRetry.counted(), None);
    }

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(MissCounter::Unset, MissCounter::PendingRetry);
        assert!(MissCounter::PendingRetry.is_pending_retry());
        assert!(!MissCounter::Unset.is_pending_retry());
    }
}
