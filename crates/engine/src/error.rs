// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error taxonomy.

use rj_adapters::RemoteError;
use rj_storage::StoreError;
use thiserror::Error;

/// Errors from staging operations
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("invalid input file: {0}")]
    InvalidInput(String),

    #[error("no file with the script role was provided")]
    MissingScript,

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("job {job_id} has no file named {name}")]
    FileNotFound { job_id: String, name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced by the orchestration core.
///
/// Persistence conflicts never appear here: the state machine maps them
/// to "already applied" no-ops before they can surface.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot determine executable for script {0}")]
    UnsupportedScript(String),
}
