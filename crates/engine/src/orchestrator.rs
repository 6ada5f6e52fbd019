// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The submission pipeline: create, stage, open workspace, upload,
//! submit, and wire up reconciliation.

use crate::error::{EngineError, StagingError};
use crate::machine::StateMachine;
use crate::monitor::{JobMonitor, MonitorConfig};
use crate::observer::PushObserver;
use crate::staging::{InputFile, StagingManager};
use rj_adapters::{JobDescription, NotifySink, RemoteAdapter};
use rj_core::{Clock, FileRole, Job, JobConfig, JobId, JobState, Resource};
use rj_storage::JobStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Orchestrator deployment settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Local directory under which per-owner, per-job staging
    /// directories are created.
    pub staging_root: PathBuf,
    /// Remote directory under which per-job workspaces are created.
    pub remote_root: String,
    pub monitor: MonitorConfig,
}

impl OrchestratorConfig {
    pub fn new(staging_root: impl Into<PathBuf>, remote_root: impl Into<String>) -> Self {
        Self {
            staging_root: staging_root.into(),
            remote_root: remote_root.into(),
            monitor: MonitorConfig::default(),
        }
    }

    rj_core::setters! {
        set {
            monitor: MonitorConfig,
        }
    }
}

/// Handle to a running job's reconciliation.
///
/// Dropping the handle does not stop the monitor; cancel it explicitly
/// or let it run to the terminal state.
#[derive(Debug)]
pub struct JobRun {
    pub job_id: JobId,
    cancel: CancellationToken,
    monitor: JoinHandle<()>,
}

impl JobRun {
    /// Stop reconciliation for this job. The stored state is left as-is.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the monitor loop to exit.
    pub async fn join(self) {
        if let Err(e) = self.monitor.await {
            tracing::warn!(job_id = %self.job_id, error = %e, "monitor task panicked");
        }
    }
}

/// Drives jobs from submission through reconciliation.
#[derive(Clone)]
pub struct Orchestrator<S, A, N, C> {
    store: S,
    adapter: A,
    sink: N,
    clock: C,
    config: OrchestratorConfig,
}

impl<S, A, N, C> Orchestrator<S, A, N, C>
where
    S: JobStore,
    A: RemoteAdapter,
    N: NotifySink,
    C: Clock,
{
    pub fn new(store: S, adapter: A, sink: N, clock: C, config: OrchestratorConfig) -> Self {
        Self { store, adapter, sink, clock, config }
    }

    pub fn machine(&self) -> StateMachine<S, N, C> {
        StateMachine::new(self.store.clone(), self.sink.clone(), self.clock.clone())
    }

    pub fn staging(&self) -> StagingManager<S> {
        StagingManager::new(self.store.clone(), self.config.staging_root.clone())
    }

    /// Submit a job and start reconciling it.
    ///
    /// Staging failures abort before anything touches the remote; remote
    /// failures after the `Staged` transition leave the job in its last
    /// recorded state for the caller to inspect. On success the job is
    /// `Submitted` with a stored remote pid, the push observer is
    /// registered, and the poll monitor is running in the background.
    pub async fn run_job(
        &self,
        config: JobConfig,
        resource: &Resource,
        inputs: Vec<InputFile>,
        silent: bool,
    ) -> Result<JobRun, EngineError> {
        let mut job = Job::new(config, &self.clock);
        let job_id = job.id.clone();
        tracing::info!(%job_id, name = %job.name, resource = %resource.url, "job created");
        self.store.insert_job(&job)?;

        let staging = self.staging();
        let staged = staging.stage_inputs(&mut job, inputs, silent).await?;
        self.store.update_job(&job)?;

        let machine = self.machine();
        let workspace = self
            .adapter
            .open_workspace(
                &resource.url,
                &format!("{}/{}", self.config.remote_root, job_id),
            )
            .await?;
        machine.transition(&job_id, JobState::Staged).await?;

        for file in &staged {
            self.adapter.upload_file(&file.path(), &workspace).await?;
        }

        let script = staged
            .iter()
            .find(|f| f.role == FileRole::Script)
            .ok_or(StagingError::MissingScript)?;
        let kind = job
            .script_kind
            .ok_or_else(|| EngineError::UnsupportedScript(script.name.clone()))?;
        let description =
            JobDescription::for_script(kind, &script.name, workspace.remote_path.clone());

        // Submitted marks "handed to the remote": it is recorded once the
        // workspace holds everything the run needs, so a failed submit
        // leaves a Submitted job with no pid rather than a partial state.
        machine.transition(&job_id, JobState::Submitted).await?;

        let handle = self.adapter.submit(&workspace, &description).await?;
        job.remote_pid = Some(handle.id.clone());
        self.store.update_job(&job)?;
        tracing::info!(%job_id, remote_pid = %handle.id, "job submitted");

        let observer = PushObserver::new(job_id.clone(), machine.clone());
        self.adapter
            .register_state_observer(&handle, Arc::new(observer))
            .await?;

        let cancel = CancellationToken::new();
        let monitor = JobMonitor::new(
            job_id.clone(),
            handle,
            workspace,
            machine,
            staging,
            self.adapter.clone(),
            self.config.monitor.clone(),
            cancel.clone(),
            description.stdout_name,
            description.stderr_name,
        )
        .spawn();

        Ok(JobRun { job_id, cancel, monitor })
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
