// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for end-to-end specs.

pub use rj_adapters::{FakeNotifySink, FakeRemoteAdapter, RemoteAdapter};
pub use rj_core::{Clock, FakeClock, FileRole, JobConfig, JobId, JobState, Resource};
pub use rj_engine::{
    EngineError, InputFile, JobRun, MonitorConfig, Orchestrator, OrchestratorConfig, StagingError,
    StagingManager,
};
pub use rj_storage::{JobStore, MemoryStore, StoreError, TransitionOutcome};
pub use std::time::Duration;

pub const REMOTE_ROOT: &str = "/remote/rj";

/// A full orchestration stack on fakes, one per spec.
pub struct Harness {
    pub store: MemoryStore,
    pub adapter: FakeRemoteAdapter,
    pub sink: FakeNotifySink,
    pub clock: FakeClock,
    pub orchestrator: Orchestrator<MemoryStore, FakeRemoteAdapter, FakeNotifySink, FakeClock>,
    pub resource: Resource,
    pub staging_dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let adapter = FakeRemoteAdapter::new();
        let sink = FakeNotifySink::new();
        let clock = FakeClock::new();
        let staging_dir = tempfile::tempdir().unwrap();

        let monitor = MonitorConfig::default()
            .poll_interval(Duration::from_millis(10))
            .settle_delay(Duration::from_millis(5))
            .retry_backoff(Duration::from_millis(5))
            .max_lifetime(Duration::from_secs(2));
        let config = OrchestratorConfig::new(staging_dir.path(), REMOTE_ROOT).monitor(monitor);

        let orchestrator = Orchestrator::new(
            store.clone(),
            adapter.clone(),
            sink.clone(),
            clock.clone(),
            config,
        );
        Self {
            store,
            adapter,
            sink,
            clock,
            orchestrator,
            resource: Resource::new("cluster", "hpc.example.org"),
            staging_dir,
        }
    }

    pub fn job_config(&self, owner: &str) -> JobConfig {
        JobConfig::builder(JobId::new(), owner, self.resource.id.clone()).build()
    }

    /// Submit a python script job with one data file.
    pub async fn submit_python_job(&self, owner: &str) -> JobRun {
        self.orchestrator
            .run_job(
                self.job_config(owner),
                &self.resource,
                vec![
                    InputFile::new("job.py", "print('hi')", FileRole::Script),
                    InputFile::new("data.csv", "1,2,3", FileRole::Input),
                ],
                false,
            )
            .await
            .unwrap()
    }

    pub fn remote_path(&self, job_id: &JobId) -> String {
        format!("{REMOTE_ROOT}/{job_id}")
    }

    pub fn remote_pid(&self, job_id: &JobId) -> String {
        self.store.load_job(job_id).unwrap().remote_pid.unwrap()
    }

    /// Script the remote run and drop its declared output files into the
    /// fake workspace.
    pub fn script_remote_run(&self, job_id: &JobId, states: Vec<JobState>) {
        let pid = self.remote_pid(job_id);
        self.adapter.set_state_sequence(&pid, states);
        let path = self.remote_path(job_id);
        self.adapter.put_remote_file(&path, "job.py.out", b"hi\n");
        self.adapter.put_remote_file(&path, "job.py.err", b"");
    }
}
