use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::models::candidate::{Candidate, InterviewStatus};
use crate::services::agent_service::{DispatchRequest, InterviewAgent};
use crate::store::{InterviewStore, TransitionFields};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub poll_interval: Duration,
    pub dispatch_timeout: Duration,
    pub max_interview_minutes: i64,
}

impl SchedulerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.scheduler_poll_secs),
            dispatch_timeout: Duration::from_secs(config.dispatch_timeout_secs),
            max_interview_minutes: config.max_interview_minutes,
        }
    }
}

/// Outcome of one sweep, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub dispatched: usize,
    pub conflicts: usize,
    pub failures: usize,
    pub escalated: usize,
    pub skipped: bool,
}

impl SweepReport {
    fn is_quiet(&self) -> bool {
        self.dispatched == 0 && self.conflicts == 0 && self.failures == 0 && self.escalated == 0
    }
}

/// Handle for stopping a running scheduler.
pub struct SchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SchedulerHandle {
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Recurring sweep over the interview state store. Ready interviews are
/// claimed with a compare-and-set transition before dispatch, so two
/// overlapping sweeps (or a sweep racing a manual action) can never hand
/// the same interview to the agent twice.
pub struct InterviewScheduler {
    store: Arc<dyn InterviewStore>,
    agent: Arc<dyn InterviewAgent>,
    config: SchedulerConfig,
    sweep_gate: tokio::sync::Mutex<()>,
}

impl InterviewScheduler {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        agent: Arc<dyn InterviewAgent>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            agent,
            config,
            sweep_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Spawn the recurring loop and return a shutdown handle.
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });
        SchedulerHandle { shutdown_tx }
    }

    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        info!(
            poll_secs = self.config.poll_interval.as_secs(),
            "Interview scheduler started"
        );
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Interview scheduler received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {
                    let report = self.sweep(Utc::now()).await;
                    if !report.is_quiet() {
                        info!(
                            dispatched = report.dispatched,
                            conflicts = report.conflicts,
                            failures = report.failures,
                            escalated = report.escalated,
                            "Sweep finished"
                        );
                    }
                }
            }
        }
        info!("Interview scheduler stopped");
    }

    /// One pass over ready and stuck records. Single-flight: if a sweep is
    /// already running, this returns immediately with `skipped` set.
    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let Ok(_guard) = self.sweep_gate.try_lock() else {
            return SweepReport {
                skipped: true,
                ..SweepReport::default()
            };
        };
        let mut report = SweepReport::default();

        let ready = match self.store.list_ready(now).await {
            Ok(ready) => ready,
            Err(e) => {
                error!(error = %e, "Failed to list ready interviews");
                return report;
            }
        };

        // Each candidate is processed independently; one failure never
        // aborts the rest of the sweep.
        for candidate in ready {
            self.claim_and_dispatch(candidate, &mut report).await;
        }

        self.escalate_stuck(now, &mut report).await;
        report
    }

    async fn claim_and_dispatch(&self, candidate: Candidate, report: &mut SweepReport) {
        let claimed = match self
            .store
            .conditional_transition(
                candidate.id,
                InterviewStatus::Scheduled,
                InterviewStatus::InProgress,
                TransitionFields::none(),
            )
            .await
        {
            Ok(claimed) => claimed,
            Err(Error::Conflict(_)) | Err(Error::NotFound(_)) => {
                // Someone else got there first; normal under concurrency.
                debug!(candidate_id = %candidate.id, "Claim lost, skipping");
                report.conflicts += 1;
                return;
            }
            Err(e) => {
                error!(candidate_id = %candidate.id, error = %e, "Claim failed");
                report.failures += 1;
                return;
            }
        };

        let request = DispatchRequest {
            candidate_id: claimed.id,
            meeting_link: claimed.meeting_link.clone().unwrap_or_default(),
        };
        match tokio::time::timeout(
            self.config.dispatch_timeout,
            self.agent.dispatch_interview(&request),
        )
        .await
        {
            Ok(Ok(())) => {
                info!(candidate_id = %claimed.id, "Interview dispatched to agent");
                report.dispatched += 1;
            }
            Ok(Err(e)) => {
                // The claim stands; the stuck sweep will pick this up if the
                // agent never reports back.
                error!(candidate_id = %claimed.id, error = %e, "Agent dispatch failed after claim");
                report.failures += 1;
            }
            Err(_) => {
                error!(candidate_id = %claimed.id, "Agent dispatch timed out after claim");
                report.failures += 1;
            }
        }
    }

    /// Records in progress longer than the maximum interview duration are
    /// administratively cancelled.
    async fn escalate_stuck(&self, now: DateTime<Utc>, report: &mut SweepReport) {
        let cutoff = now - chrono::Duration::minutes(self.config.max_interview_minutes);
        let stuck = match self.store.list_stuck(cutoff).await {
            Ok(stuck) => stuck,
            Err(e) => {
                error!(error = %e, "Failed to list stuck interviews");
                return;
            }
        };

        for candidate in stuck {
            match self
                .store
                .conditional_transition(
                    candidate.id,
                    InterviewStatus::InProgress,
                    InterviewStatus::Cancelled,
                    TransitionFields::none(),
                )
                .await
            {
                Ok(_) => {
                    warn!(
                        candidate_id = %candidate.id,
                        "Interview exceeded maximum duration without results, cancelled"
                    );
                    report.escalated += 1;
                }
                Err(Error::Conflict(_)) | Err(Error::NotFound(_)) => {
                    debug!(candidate_id = %candidate.id, "Stuck record moved on its own");
                }
                Err(e) => {
                    error!(candidate_id = %candidate.id, error = %e, "Failed to escalate stuck interview");
                }
            }
        }
    }
}
