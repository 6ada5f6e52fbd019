// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `JobStore` trait: the single persistence path the engine writes
//! through.

use rj_core::{FileRole, Job, JobId, JobState, JobStateHistory, StagingFile};
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("job already exists: {0}")]
    DuplicateJob(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result of a guarded transition attempt.
///
/// `Conflict` is not an error: it means another writer won the guard for
/// this `(job_id, expected_old_state)` pair, and the caller's proposal
/// is discarded as a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The transition was recorded; carries the appended history record.
    Applied(JobStateHistory),
    /// The stored state no longer matched `expected_old`; nothing written.
    Conflict { current: JobState },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }
}

/// Persistence interface consumed by the orchestration core.
///
/// `transition_guarded` is the compare-and-set boundary that makes the
/// dual-signal reconciliation safe: the expected-old-state comparison,
/// history append, and `last_status` update happen as one atomic unit
/// inside the implementation. Everything else is plain record I/O.
///
/// Implementations must be cheap to clone (shared handle) and callable
/// from concurrent tasks.
pub trait JobStore: Clone + Send + Sync + 'static {
    /// Load a job by id.
    fn load_job(&self, id: &JobId) -> Result<Job, StoreError>;

    /// Insert a newly created job record.
    fn insert_job(&self, job: &Job) -> Result<(), StoreError>;

    /// Update a job's non-state fields (script body, kind, remote handle).
    ///
    /// `last_status` is deliberately NOT written here; state changes go
    /// through `transition_guarded` only.
    fn update_job(&self, job: &Job) -> Result<(), StoreError>;

    /// Atomically append a history record and update `last_status`,
    /// guarded on the stored state still equalling `expected_old`.
    fn transition_guarded(
        &self,
        id: &JobId,
        expected_old: JobState,
        new_state: JobState,
        changed_at_epoch_ms: u64,
    ) -> Result<TransitionOutcome, StoreError>;

    /// Full transition history for a job, in append order.
    fn history(&self, id: &JobId) -> Result<Vec<JobStateHistory>, StoreError>;

    /// Append a staging file record.
    fn save_staging_file(&self, file: &StagingFile) -> Result<(), StoreError>;

    /// Staging files for a job, optionally filtered by role.
    fn query_staging_files(
        &self,
        id: &JobId,
        role: Option<FileRole>,
    ) -> Result<Vec<StagingFile>, StoreError>;
}
