// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process reference store.
//!
//! One mutex guards jobs, history, and staging files together so that the
//! guarded transition is a single critical section. The lock is only ever
//! held for map operations; callers never hold it across adapter calls.

use crate::store::{JobStore, StoreError, TransitionOutcome};
use parking_lot::Mutex;
use rj_core::{FileRole, Job, JobId, JobState, JobStateHistory, StagingFile};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Tables {
    jobs: HashMap<JobId, Job>,
    history: HashMap<JobId, Vec<JobStateHistory>>,
    staging_files: HashMap<JobId, Vec<StagingFile>>,
}

/// In-memory `JobStore` implementation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for MemoryStore {
    fn load_job(&self, id: &JobId) -> Result<Job, StoreError> {
        self.inner
            .lock()
            .jobs
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))
    }

    fn insert_job(&self, job: &Job) -> Result<(), StoreError> {
        let mut tables = self.inner.lock();
        if tables.jobs.contains_key(&job.id) {
            return Err(StoreError::DuplicateJob(job.id.to_string()));
        }
        tables.jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    fn update_job(&self, job: &Job) -> Result<(), StoreError> {
        let mut tables = self.inner.lock();
        let stored = tables
            .jobs
            .get_mut(&job.id)
            .ok_or_else(|| StoreError::JobNotFound(job.id.to_string()))?;
        // Preserve the authoritative state; everything else follows the caller.
        let last_status = stored.last_status;
        *stored = job.clone();
        stored.last_status = last_status;
        Ok(())
    }

    fn transition_guarded(
        &self,
        id: &JobId,
        expected_old: JobState,
        new_state: JobState,
        changed_at_epoch_ms: u64,
    ) -> Result<TransitionOutcome, StoreError> {
        let mut tables = self.inner.lock();
        let job = tables
            .jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))?;

        if job.last_status != expected_old {
            return Ok(TransitionOutcome::Conflict { current: job.last_status });
        }

        job.last_status = new_state;
        let record =
            JobStateHistory::new(id.clone(), expected_old, new_state, changed_at_epoch_ms);
        tables.history.entry(id.clone()).or_default().push(record.clone());

        tracing::debug!(
            job_id = %id,
            old = %expected_old,
            new = %new_state,
            "state transition recorded"
        );
        Ok(TransitionOutcome::Applied(record))
    }

    fn history(&self, id: &JobId) -> Result<Vec<JobStateHistory>, StoreError> {
        Ok(self.inner.lock().history.get(id).cloned().unwrap_or_default())
    }

    fn save_staging_file(&self, file: &StagingFile) -> Result<(), StoreError> {
        self.inner
            .lock()
            .staging_files
            .entry(file.job_id.clone())
            .or_default()
            .push(file.clone());
        Ok(())
    }

    fn query_staging_files(
        &self,
        id: &JobId,
        role: Option<FileRole>,
    ) -> Result<Vec<StagingFile>, StoreError> {
        let tables = self.inner.lock();
        let files = tables.staging_files.get(id).cloned().unwrap_or_default();
        Ok(match role {
            Some(role) => files.into_iter().filter(|f| f.role == role).collect(),
            None => files,
        })
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
