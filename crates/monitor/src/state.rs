//! FailoverState: the monitoring/failover state machine.
//!
//! One instance per process, owned by the runner. All mutation happens
//! inside [`StateMachine::handle`]; the struct performs no I/O.
//!
//! The machine moves between three logical states: FreshEpoch (no baseline
//! yet), Monitoring (baseline established, counting misses) and
//! RotationPending (key update submitted, awaiting confirmation). There is
//! no terminal state; the machine runs until process termination.

use crate::MonitorConfig;
use sentinel_core::{Action, Event, Report, StateMachine};
use sentinel_types::{KeyRing, MissCounter, SigningKey, WitnessName, WitnessStatus};
use tracing::{debug, info, warn};

/// Monitoring state for a single witness account.
pub struct FailoverState {
    witness: WitnessName,
    ring: KeyRing,
    config: MonitorConfig,

    /// Missed count observed when the current epoch began. `None` means
    /// the next sample starts a fresh epoch.
    baseline_missed: Option<u64>,

    /// Missed count observed on the previous sample, or the retry
    /// sentinel after an unconfirmed rotation.
    previous_missed: MissCounter,

    /// Samples processed since process start. Never resets; only
    /// `tick_of_last_miss` and `baseline_missed` do.
    tick: u64,

    /// Tick at which the most recent genuine miss was recorded (or the
    /// current epoch began).
    tick_of_last_miss: u64,

    /// Ring index of the key the next rotation targets. Advances only on
    /// confirmed rotation.
    next_key: usize,

    /// Last-known on-chain signing key, refreshed every sample.
    active_key: SigningKey,

    /// Target of the rotation currently awaiting confirmation.
    pending_rotation: Option<SigningKey>,
}

impl std::fmt::Debug for FailoverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailoverState")
            .field("witness", &self.witness)
            .field("baseline_missed", &self.baseline_missed)
            .field("previous_missed", &self.previous_missed)
            .field("tick", &self.tick)
            .field("tick_of_last_miss", &self.tick_of_last_miss)
            .field("next_key", &self.next_key)
            .field("pending_rotation", &self.pending_rotation)
            .finish()
    }
}

impl FailoverState {
    /// Create monitoring state seeded from the witness's live status.
    ///
    /// The baseline stays unset so the first sample establishes a fresh
    /// epoch from the then-current counter.
    pub fn new(
        witness: WitnessName,
        ring: KeyRing,
        initial: &WitnessStatus,
        config: MonitorConfig,
    ) -> Self {
        let next_key = ring
            .position(&initial.signing_key)
            .map(|i| ring.next(i))
            .unwrap_or(0);

        Self {
            witness,
            ring,
            config,
            baseline_missed: None,
            previous_missed: MissCounter::Unset,
            tick: 0,
            tick_of_last_miss: 0,
            next_key,
            active_key: initial.signing_key.clone(),
            pending_rotation: None,
        }
    }

    pub fn witness(&self) -> &WitnessName {
        &self.witness
    }

    pub fn active_key(&self) -> &SigningKey {
        &self.active_key
    }

    /// Snapshot of the counters for tests and the status endpoint.
    pub fn stats(&self) -> MonitorStats {
        MonitorStats {
            samples: self.tick,
            baseline_missed: self.baseline_missed,
            previous_missed: self.previous_missed,
            tick_of_last_miss: self.tick_of_last_miss,
            next_key_index: self.next_key,
            retry_pending: self.previous_missed.is_pending_retry(),
            rotation_in_flight: self.pending_rotation.is_some(),
        }
    }

    /// Establish a fresh epoch from the current counter.
    ///
    /// The baseline is a floating reference point: the miss delta measures
    /// misses since monitoring began this epoch, not lifetime misses.
    /// `next_key` is re-derived from the active key's ring position; after
    /// a confirmed rotation this agrees with the circular advance already
    /// applied, so the index only moves on confirmed rotations.
    fn begin_epoch(&mut self, total_missed: u64) {
        self.baseline_missed = Some(total_missed);
        self.previous_missed = MissCounter::Counted(total_missed);
        self.tick_of_last_miss = self.tick;
        self.next_key = self
            .ring
            .position(&self.active_key)
            .map(|i| self.ring.next(i))
            .unwrap_or(0);

        debug!(
            witness = %self.witness,
            baseline = total_missed,
            next_key = self.next_key,
            "epoch baseline established"
        );
    }

    /// Begin a rotation against the current target key.
    fn start_rotation(&mut self) -> Vec<Action> {
        let key = self.ring.get(self.next_key).clone();
        self.pending_rotation = Some(key.clone());

        warn!(witness = %self.witness, key = %key, "rotating signing key");

        vec![
            Action::Report(Report::RotationTriggered { key: key.clone() }),
            Action::SubmitKeyUpdate {
                key,
                confirm_after: self.config.confirm_delay,
            },
        ]
    }

    fn on_status(&mut self, status: WitnessStatus) -> Vec<Action> {
        self.active_key = status.signing_key.clone();
        let total = status.total_missed;

        let mut actions = vec![Action::Report(Report::Sampled {
            sample: self.tick,
            total_missed: total,
            tick_of_last_miss: self.tick_of_last_miss,
            active_key_prefix: self.active_key.prefix().to_string(),
        })];

        if self.baseline_missed.is_none() {
            self.begin_epoch(total);
        }

        match self.previous_missed {
            MissCounter::PendingRetry => {
                // A prior rotation left the key unchanged: still not
                // rotated. Re-enter rotation against the same target key
                // without recounting a miss.
                actions.extend(self.start_rotation());
            }
            MissCounter::Counted(previous) if total > previous => {
                self.tick_of_last_miss = self.tick;
                let baseline = self.baseline_missed.unwrap_or(previous);
                let delta = previous.saturating_sub(baseline);
                self.previous_missed = MissCounter::Counted(total);

                info!(
                    witness = %self.witness,
                    delta,
                    total_missed = total,
                    "missed another block"
                );
                actions.push(Action::Report(Report::MissedBlock {
                    delta,
                    total_missed: total,
                }));

                if delta >= self.config.flip_threshold {
                    actions.extend(self.start_rotation());
                }
            }
            _ => {
                // No new miss this tick. Forgive old misses once the
                // witness has behaved for the full quiet period.
                let quiet_ticks = self.tick.saturating_sub(self.tick_of_last_miss);
                if quiet_ticks >= self.config.reset_threshold {
                    self.baseline_missed = None;
                    debug!(
                        witness = %self.witness,
                        quiet_ticks,
                        "quiet period elapsed, resetting baseline"
                    );
                    actions.push(Action::Report(Report::EpochReset { quiet_ticks }));
                }
            }
        }

        self.tick += 1;
        actions
    }

    fn on_fetch_failed(&mut self, reason: String) -> Vec<Action> {
        // Recoverable: the tick is abandoned without touching counters and
        // the next scheduled sample retries.
        warn!(witness = %self.witness, %reason, "status fetch failed");
        vec![Action::Report(Report::FetchFailed { reason })]
    }

    fn on_submit_failed(&mut self, reason: String) -> Vec<Action> {
        // The update never confirmed, so the same target key must be
        // retried on the next sample without recounting a miss.
        self.pending_rotation = None;
        self.previous_missed = MissCounter::PendingRetry;

        warn!(witness = %self.witness, %reason, "key update submission failed");
        vec![Action::Report(Report::SubmitFailed { reason })]
    }

    fn on_rotation_outcome(&mut self, status: WitnessStatus) -> Vec<Action> {
        let Some(target) = self.pending_rotation.take() else {
            // No rotation in flight; stale outcome.
            debug!(witness = %self.witness, "ignoring rotation outcome with no rotation in flight");
            return Vec::new();
        };

        if status.signing_key == target {
            self.active_key = status.signing_key;
            self.baseline_missed = None;
            self.next_key = self.ring.next(self.next_key);

            info!(
                witness = %self.witness,
                key = %target,
                "witness updated, now signing with new key"
            );
            vec![Action::Report(Report::Rotated { key: target })]
        } else {
            // Transaction may not have propagated or was rejected. Retry
            // the same key next sample; the retry sentinel keeps the miss
            // delta from re-triggering the threshold.
            self.previous_missed = MissCounter::PendingRetry;

            warn!(
                witness = %self.witness,
                key = %target,
                "signing key did not change, retrying next sample"
            );
            vec![Action::Report(Report::RetryScheduled { key: target })]
        }
    }
}

impl StateMachine for FailoverState {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::StatusObserved { status } => self.on_status(status),
            Event::StatusFetchFailed { reason } => self.on_fetch_failed(reason),
            Event::RotationSubmitFailed { reason } => self.on_submit_failed(reason),
            Event::RotationOutcome { status } => self.on_rotation_outcome(status),
        }
    }
}

/// Counter snapshot from the failover state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStats {
    /// Samples processed since process start.
    pub samples: u64,
    /// Epoch baseline, if one is established.
    pub baseline_missed: Option<u64>,
    /// Previous sample's counter or the retry sentinel.
    pub previous_missed: MissCounter,
    /// Tick of the most recent genuine miss.
    pub tick_of_last_miss: u64,
    /// Ring index the next rotation targets.
    pub next_key_index: usize,
    /// Whether an unconfirmed rotation awaits retry.
    pub retry_pending: bool,
    /// Whether a rotation is currently awaiting confirmation.
    pub rotation_in_flight: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 3] = ["BTS_backup_one", "BTS_backup_two", "BTS_backup_three"];
    const PRIMARY: &str = "BTS_primary_key";

    fn ring() -> KeyRing {
        KeyRing::new(KEYS.iter().map(|k| SigningKey::from(*k)).collect()).unwrap()
    }

    fn config() -> MonitorConfig {
        MonitorConfig::new()
            .with_flip_threshold(3)
            .with_reset_threshold(240)
            .with_confirm_delay(std::time::Duration::ZERO)
    }

    fn status(key: &str, missed: u64) -> WitnessStatus {
        WitnessStatus::new(SigningKey::from(key), missed)
    }

    fn state_with(active: &str, missed: u64, config: MonitorConfig) -> FailoverState {
        FailoverState::new(
            WitnessName::from("init-witness"),
            ring(),
            &status(active, missed),
            config,
        )
    }

    fn observe(state: &mut FailoverState, key: &str, missed: u64) -> Vec<Action> {
        state.handle(Event::StatusObserved {
            status: status(key, missed),
        })
    }

    fn reports(actions: &[Action]) -> Vec<Report> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Report(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    fn submitted_key(actions: &[Action]) -> Option<SigningKey> {
        actions.iter().find_map(|a| match a {
            Action::SubmitKeyUpdate { key, .. } => Some(key.clone()),
            _ => None,
        })
    }

    fn miss_deltas(actions: &[Action]) -> Vec<u64> {
        reports(actions)
            .into_iter()
            .filter_map(|r| match r {
                Report::MissedBlock { delta, .. } => Some(delta),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn steady_counter_establishes_baseline_without_rotation() {
        // Scenario A: totalMissed stays at 5 across three samples.
        let mut state = state_with(PRIMARY, 5, config());

        for _ in 0..3 {
            let actions = observe(&mut state, PRIMARY, 5);
            assert!(submitted_key(&actions).is_none());
            assert!(miss_deltas(&actions).is_empty());
        }

        let stats = state.stats();
        assert_eq!(stats.baseline_missed, Some(5));
        assert_eq!(stats.previous_missed, MissCounter::Counted(5));
        assert_eq!(stats.samples, 3);
    }

    #[test]
    fn deltas_accumulate_and_cross_threshold() {
        // Scenario B: baseline 5, counter climbs by one each sample.
        // Deltas are measured from the previous sample, so they lag one
        // behind: 0, 1, 2, then 3 fires the rotation.
        let mut state = state_with(PRIMARY, 5, config());
        observe(&mut state, PRIMARY, 5);

        let mut all_deltas = Vec::new();
        let mut rotated_at = None;
        for (i, missed) in [6u64, 7, 8, 9].into_iter().enumerate() {
            let actions = observe(&mut state, PRIMARY, missed);
            all_deltas.extend(miss_deltas(&actions));
            if submitted_key(&actions).is_some() {
                rotated_at = Some(i);
            }
        }

        assert_eq!(all_deltas, vec![0, 1, 2, 3]);
        assert_eq!(rotated_at, Some(3), "rotation fires when delta reaches 3");
    }

    #[test]
    fn rotation_targets_ring_key_after_active() {
        // Active key sits at ring position 0, so the rotation targets
        // position 1 - always distinct from the active key.
        let mut state = state_with(KEYS[0], 0, config());
        observe(&mut state, KEYS[0], 0);
        assert_eq!(state.stats().next_key_index, 1);

        // Active key not in the ring: rotation starts at index 0.
        let mut state = state_with(PRIMARY, 0, config());
        observe(&mut state, PRIMARY, 0);
        assert_eq!(state.stats().next_key_index, 0);
    }

    /// Drive a state to the point where a rotation has been submitted.
    fn drive_to_rotation(state: &mut FailoverState) -> SigningKey {
        observe(state, PRIMARY, 5);
        let mut submitted = None;
        for missed in [6u64, 7, 8, 9] {
            let actions = observe(state, PRIMARY, missed);
            if let Some(key) = submitted_key(&actions) {
                submitted = Some(key);
            }
        }
        submitted.expect("threshold crossing must submit a rotation")
    }

    #[test]
    fn confirmed_rotation_starts_fresh_epoch() {
        // Scenario D: confirmation shows the target key on-chain.
        let mut state = state_with(PRIMARY, 5, config());
        let target = drive_to_rotation(&mut state);
        assert_eq!(target, SigningKey::from(KEYS[0]));
        assert!(state.stats().rotation_in_flight);

        let actions = state.handle(Event::RotationOutcome {
            status: status(KEYS[0], 9),
        });
        assert_eq!(
            reports(&actions),
            vec![Report::Rotated {
                key: target.clone()
            }]
        );

        let stats = state.stats();
        assert_eq!(stats.baseline_missed, None, "next sample re-baselines");
        assert_eq!(stats.next_key_index, 1, "ring index advanced circularly");
        assert!(!stats.rotation_in_flight);

        // The next sample establishes a fresh baseline at the current
        // counter: prior misses never count toward a future threshold.
        let actions = observe(&mut state, KEYS[0], 9);
        assert!(miss_deltas(&actions).is_empty());
        assert_eq!(state.stats().baseline_missed, Some(9));
    }

    #[test]
    fn unconfirmed_rotation_retries_same_key() {
        // Scenario C: confirmation shows the key unchanged.
        let mut state = state_with(PRIMARY, 5, config());
        let target = drive_to_rotation(&mut state);
        let next_key_before = state.stats().next_key_index;

        let actions = state.handle(Event::RotationOutcome {
            status: status(PRIMARY, 9),
        });
        assert_eq!(
            reports(&actions),
            vec![Report::RetryScheduled {
                key: target.clone()
            }]
        );

        let stats = state.stats();
        assert!(stats.retry_pending);
        assert_eq!(
            stats.next_key_index, next_key_before,
            "retry targets the same key"
        );

        // The following sample re-enters rotation without recounting a
        // miss, even though the counter moved again.
        let actions = observe(&mut state, PRIMARY, 10);
        assert!(miss_deltas(&actions).is_empty());
        assert_eq!(submitted_key(&actions), Some(target));
    }

    #[test]
    fn submit_failure_retries_same_key_next_sample() {
        let mut state = state_with(PRIMARY, 5, config());
        let target = drive_to_rotation(&mut state);

        let actions = state.handle(Event::RotationSubmitFailed {
            reason: "wallet locked".to_string(),
        });
        assert!(matches!(reports(&actions)[..], [Report::SubmitFailed { .. }]));
        assert!(state.stats().retry_pending);
        assert!(!state.stats().rotation_in_flight);

        let actions = observe(&mut state, PRIMARY, 9);
        assert_eq!(submitted_key(&actions), Some(target));
        assert!(miss_deltas(&actions).is_empty());
    }

    #[test]
    fn single_key_ring_always_retargets_same_key() {
        // Scenario E: KeyRing of length 1.
        let ring = KeyRing::new(vec![SigningKey::from("BTS_only")]).unwrap();
        let mut state = FailoverState::new(
            WitnessName::from("init-witness"),
            ring,
            &status(PRIMARY, 5),
            config(),
        );

        let target = drive_to_rotation(&mut state);
        assert_eq!(target, SigningKey::from("BTS_only"));
        assert_eq!(state.stats().next_key_index, 0);

        // Unconfirmed, then retried: still the same single key.
        state.handle(Event::RotationOutcome {
            status: status(PRIMARY, 9),
        });
        let actions = observe(&mut state, PRIMARY, 9);
        assert_eq!(submitted_key(&actions), Some(SigningKey::from("BTS_only")));
        assert_eq!(state.stats().next_key_index, 0);

        // Confirmed: the index wraps straight back to 0.
        let actions = state.handle(Event::RotationOutcome {
            status: status("BTS_only", 9),
        });
        assert!(matches!(reports(&actions)[..], [Report::Rotated { .. }]));
        assert_eq!(state.stats().next_key_index, 0);
    }

    #[test]
    fn quiet_period_forgives_old_misses() {
        let mut state = state_with(PRIMARY, 5, config().with_reset_threshold(4));
        observe(&mut state, PRIMARY, 5);

        // Two misses put the delta at 1.
        observe(&mut state, PRIMARY, 6);
        observe(&mut state, PRIMARY, 7);
        assert_eq!(state.stats().baseline_missed, Some(5));

        // Quiet samples until the reset threshold elapses.
        let mut reset_seen = false;
        for _ in 0..4 {
            let actions = observe(&mut state, PRIMARY, 7);
            reset_seen |= reports(&actions)
                .iter()
                .any(|r| matches!(r, Report::EpochReset { .. }));
        }
        assert!(reset_seen, "quiet period must reset the baseline");
        assert_eq!(state.stats().baseline_missed, None);

        // The next sample re-baselines at the then-current counter: the
        // old misses are forgiven and the threshold count starts over.
        let actions = observe(&mut state, PRIMARY, 8);
        assert_eq!(state.stats().baseline_missed, Some(8));
        assert!(submitted_key(&actions).is_none());
    }

    #[test]
    fn fetch_failure_leaves_counters_untouched() {
        let mut state = state_with(PRIMARY, 5, config());
        observe(&mut state, PRIMARY, 6);
        let before = state.stats();

        let actions = state.handle(Event::StatusFetchFailed {
            reason: "connection refused".to_string(),
        });
        assert!(matches!(reports(&actions)[..], [Report::FetchFailed { .. }]));
        assert_eq!(state.stats(), before, "tick index must not advance");
    }

    #[test]
    fn tick_index_never_resets() {
        let mut state = state_with(PRIMARY, 5, config().with_reset_threshold(2));
        for _ in 0..5 {
            observe(&mut state, PRIMARY, 5);
        }
        // Quiet reset happened along the way, but the sample count keeps
        // climbing for the life of the process.
        assert_eq!(state.stats().samples, 5);

        let target = {
            let mut submitted = None;
            for missed in [6u64, 7, 8, 9] {
                if let Some(key) = submitted_key(&observe(&mut state, PRIMARY, missed)) {
                    submitted = Some(key);
                }
            }
            submitted.expect("rotation")
        };
        state.handle(Event::RotationOutcome {
            status: status(target.as_str(), 9),
        });
        observe(&mut state, target.as_str(), 9);
        assert_eq!(state.stats().samples, 10);
    }

    #[test]
    fn baseline_never_exceeds_previous_within_epoch() {
        // Non-decreasing counter sequence keeps the invariant
        // baseline <= previous, so every delta is well-defined.
        let mut state = state_with(PRIMARY, 3, config().with_flip_threshold(100));
        for missed in [3u64, 3, 4, 4, 6, 9, 9, 12] {
            observe(&mut state, PRIMARY, missed);
            let stats = state.stats();
            let baseline = stats.baseline_missed.expect("epoch established");
            let previous = stats.previous_missed.counted().expect("counted");
            assert!(baseline <= previous);
        }
    }

    #[test]
    fn stale_rotation_outcome_is_ignored() {
        let mut state = state_with(PRIMARY, 5, config());
        let actions = state.handle(Event::RotationOutcome {
            status: status(KEYS[0], 5),
        });
        assert!(actions.is_empty());
    }

    #[test]
    fn every_sample_emits_a_status_line() {
        let mut state = state_with(PRIMARY, 5, config());
        let actions = observe(&mut state, PRIMARY, 5);
        match &reports(&actions)[..] {
            [Report::Sampled {
                sample,
                total_missed,
                active_key_prefix,
                ..
            }, ..] => {
                assert_eq!(*sample, 0);
                assert_eq!(*total_missed, 5);
                assert_eq!(active_key_prefix, SigningKey::from(PRIMARY).prefix());
            }
            other => panic!("expected leading Sampled report, got {other:?}"),
        }
    }
}
