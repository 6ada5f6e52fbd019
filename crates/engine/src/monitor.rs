// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll-side reconciliation: the per-job monitor loop.

use crate::machine::StateMachine;
use crate::staging::StagingManager;
use rj_adapters::{NotifySink, RemoteAdapter, RemoteHandle, WorkspaceHandle};
use rj_core::{Clock, JobId};
use rj_storage::JobStore;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Timing knobs for a [`JobMonitor`].
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between remote state polls.
    pub poll_interval: Duration,
    /// Grace period between first seeing a terminal state and the
    /// confirmatory re-read, so late remote writes settle.
    pub settle_delay: Duration,
    /// Initial backoff after a failed state query; doubles per
    /// consecutive failure up to a minute.
    pub retry_backoff: Duration,
    /// Hard cap on how long a monitor may run before declaring the job
    /// failed.
    pub max_lifetime: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            settle_delay: Duration::from_secs(3),
            retry_backoff: Duration::from_secs(1),
            max_lifetime: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl MonitorConfig {
    rj_core::setters! {
        set {
            poll_interval: Duration,
            settle_delay: Duration,
            retry_backoff: Duration,
            max_lifetime: Duration,
        }
    }
}

const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(60);

/// Periodically reconciles one job's stored state against the remote.
///
/// The monitor is the authority on job completion: only it performs the
/// settle-and-confirm read and the output retrieval. Push callbacks may
/// record the terminal transition first; the monitor still observes the
/// terminal remote state on its next poll and runs the completion path.
pub struct JobMonitor<S, A, N, C> {
    job_id: JobId,
    handle: RemoteHandle,
    workspace: WorkspaceHandle,
    machine: StateMachine<S, N, C>,
    staging: StagingManager<S>,
    adapter: A,
    config: MonitorConfig,
    cancel: CancellationToken,
    declared_output: String,
    declared_error: String,
}

impl<S, A, N, C> JobMonitor<S, A, N, C>
where
    S: JobStore,
    A: RemoteAdapter,
    N: NotifySink,
    C: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_id: JobId,
        handle: RemoteHandle,
        workspace: WorkspaceHandle,
        machine: StateMachine<S, N, C>,
        staging: StagingManager<S>,
        adapter: A,
        config: MonitorConfig,
        cancel: CancellationToken,
        declared_output: String,
        declared_error: String,
    ) -> Self {
        Self {
            job_id,
            handle,
            workspace,
            machine,
            staging,
            adapter,
            config,
            cancel,
            declared_output,
            declared_error,
        }
    }

    /// Spawn the monitor loop as a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let deadline = tokio::time::Instant::now() + self.config.max_lifetime;
        let mut backoff = self.config.retry_backoff;

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::info!(job_id = %self.job_id, "monitor cancelled");
                    return;
                }
                () = tokio::time::sleep(self.config.poll_interval) => {}
            }

            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(job_id = %self.job_id, "monitor lifetime exceeded");
                if let Err(e) = self
                    .machine
                    .transition(&self.job_id, rj_core::JobState::Failed)
                    .await
                {
                    tracing::warn!(job_id = %self.job_id, error = %e, "lifetime transition failed");
                }
                return;
            }

            let observed = match self.adapter.query_state(&self.handle).await {
                Ok(state) => {
                    backoff = self.config.retry_backoff;
                    state
                }
                Err(e) => {
                    // Transient by assumption: back off and re-poll, never
                    // conclude anything about the job from a failed query.
                    tracing::warn!(job_id = %self.job_id, error = %e, "state query failed");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_RETRY_BACKOFF);
                    continue;
                }
            };

            if !observed.is_terminal() {
                // Idempotent through the guard; a repeat poll is a no-op.
                if let Err(e) = self.machine.transition(&self.job_id, observed).await {
                    tracing::warn!(job_id = %self.job_id, error = %e, "poll transition failed");
                }
                continue;
            }

            self.finish(observed).await;
            return;
        }
    }

    /// Completion path: settle, confirm, record, retrieve. Runs once.
    async fn finish(&self, observed: rj_core::JobState) {
        tokio::time::sleep(self.config.settle_delay).await;

        let terminal = match self.adapter.query_state(&self.handle).await {
            Ok(confirmed) if confirmed.is_terminal() => confirmed,
            Ok(confirmed) => {
                tracing::warn!(
                    job_id = %self.job_id,
                    first = %observed,
                    second = %confirmed,
                    "terminal state not confirmed, keeping first observation"
                );
                observed
            }
            Err(e) => {
                tracing::warn!(job_id = %self.job_id, error = %e, "confirmatory query failed");
                observed
            }
        };

        if let Err(e) = self.machine.transition(&self.job_id, terminal).await {
            tracing::warn!(job_id = %self.job_id, error = %e, "terminal transition failed");
        }

        let job = match self.machine.store().load_job(&self.job_id) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(job_id = %self.job_id, error = %e, "job vanished before retrieval");
                return;
            }
        };
        if let Err(e) = self
            .staging
            .retrieve_outputs(
                &job,
                &self.adapter,
                &self.workspace,
                &self.declared_output,
                &self.declared_error,
            )
            .await
        {
            tracing::warn!(job_id = %self.job_id, error = %e, "output retrieval failed");
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
