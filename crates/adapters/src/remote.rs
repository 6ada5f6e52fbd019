// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The remote execution capability boundary.
//!
//! The core orchestrates against this trait; it never reimplements a
//! remote execution protocol. All methods are potentially slow network
//! calls and must not be invoked while holding in-process locks.

use async_trait::async_trait;
use rj_core::{JobState, ScriptKind};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors from remote transport operations
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{what} timed out after {seconds}s")]
    Timeout { what: String, seconds: u64 },

    #[error("{what} failed (exit {code}): {stderr}")]
    CommandFailed { what: String, code: i32, stderr: String },

    #[error("remote job handle unknown: {0}")]
    UnknownHandle(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Handle to an opened remote job workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceHandle {
    /// Host address of the resource.
    pub resource_url: String,
    /// Absolute directory path on the remote side.
    pub remote_path: String,
}

/// Handle to a submitted remote job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHandle {
    pub resource_url: String,
    /// Remote process/job identifier, opaque to the core.
    pub id: String,
    /// Working directory of the submitted job.
    pub workdir: String,
}

/// One entry in a remote workspace listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
}

/// Description of a job to submit: what to run, where, and how output is
/// captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescription {
    pub working_directory: String,
    pub executable: String,
    pub arguments: Vec<String>,
    /// File name stdout is redirected to, relative to the working directory.
    pub stdout_name: String,
    /// File name stderr is redirected to, relative to the working directory.
    pub stderr_name: String,
}

impl JobDescription {
    /// Build the description for a staged script.
    ///
    /// The executable follows the script kind; the argument list is the
    /// script name alone, and stdout/stderr capture files are named after
    /// the script.
    pub fn for_script(
        kind: ScriptKind,
        script_name: &str,
        working_directory: impl Into<String>,
    ) -> Self {
        Self {
            working_directory: working_directory.into(),
            executable: kind.executable().to_string(),
            arguments: vec![script_name.to_string()],
            stdout_name: format!("{script_name}.out"),
            stderr_name: format!("{script_name}.err"),
        }
    }
}

/// Observer invoked by the adapter whenever the remote job's state changes.
///
/// Runs on the adapter's own concurrency context; the core treats it as an
/// independent concurrent caller.
#[async_trait]
pub trait StateObserver: Send + Sync + 'static {
    async fn state_changed(&self, state: JobState);
}

/// Adapter for remote workspace management and job execution.
#[async_trait]
pub trait RemoteAdapter: Clone + Send + Sync + 'static {
    /// Open (create if absent, including parents) a workspace directory on
    /// the resource. Idempotent: opening an existing path succeeds.
    async fn open_workspace(
        &self,
        resource_url: &str,
        remote_path: &str,
    ) -> Result<WorkspaceHandle, RemoteError>;

    /// Upload a local file into the workspace, keeping its file name.
    async fn upload_file(
        &self,
        local: &Path,
        workspace: &WorkspaceHandle,
    ) -> Result<(), RemoteError>;

    /// Submit a described job for execution in the workspace.
    async fn submit(
        &self,
        workspace: &WorkspaceHandle,
        description: &JobDescription,
    ) -> Result<RemoteHandle, RemoteError>;

    /// Query the current remote state of a submitted job.
    async fn query_state(&self, handle: &RemoteHandle) -> Result<JobState, RemoteError>;

    /// Register an observer for state changes of a submitted job.
    async fn register_state_observer(
        &self,
        handle: &RemoteHandle,
        observer: Arc<dyn StateObserver>,
    ) -> Result<(), RemoteError>;

    /// List the entries currently present in the workspace.
    async fn list_workspace_entries(
        &self,
        workspace: &WorkspaceHandle,
    ) -> Result<Vec<RemoteEntry>, RemoteError>;

    /// Copy one workspace entry to a local destination directory.
    async fn copy_from_workspace(
        &self,
        workspace: &WorkspaceHandle,
        entry: &RemoteEntry,
        local_dest: &Path,
    ) -> Result<(), RemoteError>;
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
