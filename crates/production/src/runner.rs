//! Monitor runner: the fixed-interval sampling loop around the state
//! machine.
//!
//! A single task owns the [`FailoverState`] and drives one tick at a time,
//! so ticks never overlap and the state needs no locking. The interval is
//! measured from the end of one tick to the start of the next sleep: a
//! rotation's confirmation delay stretches its own tick but does not
//! compound across ticks.

use crate::chain::{ChainReader, KeyRotator};
use crate::metrics;
use crate::rpc::MonitorStatusState;
use sentinel_core::{Action, Event, Report, StateMachine};
use sentinel_monitor::FailoverState;
use sentinel_types::WitnessName;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, RwLock};
use tracing::{debug, info};

/// Handle for shutting down a running [`MonitorRunner`].
///
/// When dropped, signals the runner to exit gracefully.
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: Option<oneshot::Sender<()>>,
}

impl ShutdownHandle {
    /// Trigger shutdown (consumes the handle).
    pub fn shutdown(mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ShutdownHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Drives the failover state machine on a fixed sampling interval.
pub struct MonitorRunner {
    state: FailoverState,
    reader: Arc<dyn ChainReader>,
    rotator: Arc<dyn KeyRotator>,
    proposal_url: String,
    sample_interval: Duration,
    status: Option<Arc<RwLock<MonitorStatusState>>>,
    shutdown_rx: oneshot::Receiver<()>,
}

impl MonitorRunner {
    pub fn new(
        state: FailoverState,
        reader: Arc<dyn ChainReader>,
        rotator: Arc<dyn KeyRotator>,
        proposal_url: String,
        sample_interval: Duration,
    ) -> (Self, ShutdownHandle) {
        let (tx, shutdown_rx) = oneshot::channel();
        let runner = Self {
            state,
            reader,
            rotator,
            proposal_url,
            sample_interval,
            status: None,
            shutdown_rx,
        };
        (runner, ShutdownHandle { tx: Some(tx) })
    }

    /// Publish per-tick status into shared state for the RPC server.
    pub fn with_status_state(mut self, status: Arc<RwLock<MonitorStatusState>>) -> Self {
        self.status = Some(status);
        self
    }

    /// Run until the shutdown handle fires (or is dropped).
    pub async fn run(self) {
        let MonitorRunner {
            mut state,
            reader,
            rotator,
            proposal_url,
            sample_interval,
            status,
            mut shutdown_rx,
        } = self;

        let witness = state.witness().clone();
        info!(
            witness = %witness,
            interval = ?sample_interval,
            "missed block monitoring started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = run_tick(
                    &mut state,
                    reader.as_ref(),
                    rotator.as_ref(),
                    &witness,
                    &proposal_url,
                    status.as_deref(),
                ) => {}
            }

            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = tokio::time::sleep(sample_interval) => {}
            }
        }

        info!(witness = %witness, "missed block monitoring stopped");
    }
}

/// Execute one monitoring tick: fetch, transition, run actions to
/// completion.
pub(crate) async fn run_tick(
    state: &mut FailoverState,
    reader: &dyn ChainReader,
    rotator: &dyn KeyRotator,
    witness: &WitnessName,
    proposal_url: &str,
    status: Option<&RwLock<MonitorStatusState>>,
) {
    let initial = match reader.witness_status(witness).await {
        Ok(sample) => state.handle(Event::StatusObserved { status: sample }),
        Err(e) => state.handle(Event::StatusFetchFailed {
            reason: e.to_string(),
        }),
    };

    let mut reports = Vec::new();
    let mut queue: VecDeque<Action> = initial.into();

    while let Some(action) = queue.pop_front() {
        match action {
            Action::Report(report) => {
                record_report(&report);
                reports.push(report);
            }
            Action::SubmitKeyUpdate { key, confirm_after } => {
                let follow_up = match rotator.submit_key_update(witness, proposal_url, &key).await
                {
                    Ok(()) => {
                        debug!(
                            key = %key,
                            delay = ?confirm_after,
                            "key update submitted, waiting to confirm"
                        );
                        tokio::time::sleep(confirm_after).await;

                        match reader.witness_status(witness).await {
                            Ok(sample) => state.handle(Event::RotationOutcome { status: sample }),
                            Err(e) => state.handle(Event::RotationSubmitFailed {
                                reason: format!("confirmation fetch failed: {e}"),
                            }),
                        }
                    }
                    Err(e) => state.handle(Event::RotationSubmitFailed {
                        reason: e.to_string(),
                    }),
                };
                queue.extend(follow_up);
            }
        }
    }

    if let Some(status) = status {
        publish_status(status, state, &reports).await;
    }
}

/// Forward a report to the metrics registry.
fn record_report(report: &Report) {
    match report {
        Report::Sampled {
            sample,
            total_missed,
            tick_of_last_miss,
            ..
        } => metrics::record_sample(*total_missed, sample.saturating_sub(*tick_of_last_miss)),
        Report::MissedBlock { .. } => metrics::record_missed_block(),
        Report::RotationTriggered { .. } => metrics::record_rotation_attempt(),
        Report::Rotated { .. } => metrics::record_rotation(),
        Report::RetryScheduled { .. } => metrics::record_rotation_retry(),
        Report::FetchFailed { .. } => metrics::record_fetch_failure(),
        Report::SubmitFailed { .. } => metrics::record_submit_failure(),
        Report::EpochReset { .. } => metrics::record_epoch_reset(),
    }
}

/// Update the shared status state consumed by the RPC server.
async fn publish_status(
    status: &RwLock<MonitorStatusState>,
    state: &FailoverState,
    reports: &[Report],
) {
    let stats = state.stats();
    let mut s = status.write().await;

    s.samples = stats.samples;
    s.tick_of_last_miss = stats.tick_of_last_miss;
    s.retry_pending = stats.retry_pending;
    s.active_key_prefix = state.active_key().prefix().to_string();

    for report in reports {
        match report {
            Report::Sampled { total_missed, .. } => s.total_missed = *total_missed,
            Report::MissedBlock { delta, .. } => s.last_miss_delta = Some(*delta),
            Report::Rotated { .. } => s.rotations += 1,
            Report::RetryScheduled { .. } => s.rotation_retries += 1,
            _ => {}
        }
    }
}
