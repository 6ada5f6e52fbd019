// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake adapters for tests: an in-memory remote fabric and a recording
//! notification sink.

use crate::notify::{NotifyError, NotifySink};
use crate::remote::{
    JobDescription, RemoteAdapter, RemoteEntry, RemoteError, RemoteHandle, StateObserver,
    WorkspaceHandle,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rj_core::{JobId, JobState};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Default)]
struct FakeRemoteState {
    /// remote_path → open_workspace call count.
    workspaces: HashMap<String, u32>,
    /// remote_path → (file name → bytes).
    files: HashMap<String, HashMap<String, Vec<u8>>>,
    /// Uploaded (local path, remote_path) pairs, in order.
    uploads: Vec<(PathBuf, String)>,
    submissions: Vec<JobDescription>,
    /// handle id → remaining scripted states (last one repeats).
    state_script: HashMap<String, Vec<JobState>>,
    /// handle id → number of upcoming query_state calls that fail.
    query_failures: HashMap<String, u32>,
    /// Number of upcoming submit calls that fail.
    submit_failures: u32,
    observers: HashMap<String, Vec<Arc<dyn StateObserver>>>,
    next_pid: u32,
}

/// In-memory `RemoteAdapter` with scripted job states.
#[derive(Clone, Default)]
pub struct FakeRemoteAdapter {
    inner: Arc<Mutex<FakeRemoteState>>,
}

impl FakeRemoteAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the sequence of states `query_state` reports for a handle.
    /// The final state repeats once the sequence is exhausted.
    pub fn set_state_sequence(&self, handle_id: &str, states: Vec<JobState>) {
        self.inner.lock().state_script.insert(handle_id.to_string(), states);
    }

    /// Make the next `count` state queries for a handle fail transiently.
    pub fn fail_next_queries(&self, handle_id: &str, count: u32) {
        self.inner.lock().query_failures.insert(handle_id.to_string(), count);
    }

    /// Make the next `count` submissions fail.
    pub fn fail_next_submits(&self, count: u32) {
        self.inner.lock().submit_failures = count;
    }

    /// Place a file into the remote workspace, as if the job wrote it.
    pub fn put_remote_file(&self, remote_path: &str, name: &str, bytes: &[u8]) {
        self.inner
            .lock()
            .files
            .entry(remote_path.to_string())
            .or_default()
            .insert(name.to_string(), bytes.to_vec());
    }

    /// Fire a push notification to every observer registered for a handle.
    pub async fn fire_state_change(&self, handle_id: &str, state: JobState) {
        let observers: Vec<_> = self
            .inner
            .lock()
            .observers
            .get(handle_id)
            .cloned()
            .unwrap_or_default();
        for observer in observers {
            observer.state_changed(state).await;
        }
    }

    /// Number of times `open_workspace` was called for a path.
    pub fn open_count(&self, remote_path: &str) -> u32 {
        self.inner.lock().workspaces.get(remote_path).copied().unwrap_or(0)
    }

    /// Uploaded (local path, remote path) pairs, in call order.
    pub fn uploads(&self) -> Vec<(PathBuf, String)> {
        self.inner.lock().uploads.clone()
    }

    /// Submitted job descriptions, in call order.
    pub fn submissions(&self) -> Vec<JobDescription> {
        self.inner.lock().submissions.clone()
    }
}

#[async_trait]
impl RemoteAdapter for FakeRemoteAdapter {
    async fn open_workspace(
        &self,
        resource_url: &str,
        remote_path: &str,
    ) -> Result<WorkspaceHandle, RemoteError> {
        let mut state = self.inner.lock();
        *state.workspaces.entry(remote_path.to_string()).or_insert(0) += 1;
        state.files.entry(remote_path.to_string()).or_default();
        Ok(WorkspaceHandle {
            resource_url: resource_url.to_string(),
            remote_path: remote_path.to_string(),
        })
    }

    async fn upload_file(
        &self,
        local: &Path,
        workspace: &WorkspaceHandle,
    ) -> Result<(), RemoteError> {
        let bytes = tokio::fs::read(local).await?;
        let name = local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut state = self.inner.lock();
        state
            .files
            .entry(workspace.remote_path.clone())
            .or_default()
            .insert(name, bytes);
        state.uploads.push((local.to_path_buf(), workspace.remote_path.clone()));
        Ok(())
    }

    async fn submit(
        &self,
        workspace: &WorkspaceHandle,
        description: &JobDescription,
    ) -> Result<RemoteHandle, RemoteError> {
        let mut state = self.inner.lock();
        if state.submit_failures > 0 {
            state.submit_failures -= 1;
            return Err(RemoteError::CommandFailed {
                what: "submit job".to_string(),
                code: 1,
                stderr: "simulated submit failure".to_string(),
            });
        }
        state.next_pid += 1;
        let id = format!("fake-pid-{}", state.next_pid);
        state.submissions.push(description.clone());
        state.state_script.entry(id.clone()).or_insert_with(|| vec![JobState::Running]);
        Ok(RemoteHandle {
            resource_url: workspace.resource_url.clone(),
            id,
            workdir: description.working_directory.clone(),
        })
    }

    async fn query_state(&self, handle: &RemoteHandle) -> Result<JobState, RemoteError> {
        let mut state = self.inner.lock();
        if let Some(failures) = state.query_failures.get_mut(&handle.id) {
            if *failures > 0 {
                *failures -= 1;
                return Err(RemoteError::Timeout {
                    what: "query state".to_string(),
                    seconds: 0,
                });
            }
        }
        let script = state
            .state_script
            .get_mut(&handle.id)
            .ok_or_else(|| RemoteError::UnknownHandle(handle.id.clone()))?;
        let next = if script.len() > 1 { script.remove(0) } else { script[0] };
        Ok(next)
    }

    async fn register_state_observer(
        &self,
        handle: &RemoteHandle,
        observer: Arc<dyn StateObserver>,
    ) -> Result<(), RemoteError> {
        self.inner
            .lock()
            .observers
            .entry(handle.id.clone())
            .or_default()
            .push(observer);
        Ok(())
    }

    async fn list_workspace_entries(
        &self,
        workspace: &WorkspaceHandle,
    ) -> Result<Vec<RemoteEntry>, RemoteError> {
        let state = self.inner.lock();
        let mut names: Vec<_> = state
            .files
            .get(&workspace.remote_path)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        Ok(names.into_iter().map(|name| RemoteEntry { name }).collect())
    }

    async fn copy_from_workspace(
        &self,
        workspace: &WorkspaceHandle,
        entry: &RemoteEntry,
        local_dest: &Path,
    ) -> Result<(), RemoteError> {
        let bytes = {
            let state = self.inner.lock();
            state
                .files
                .get(&workspace.remote_path)
                .and_then(|files| files.get(&entry.name))
                .cloned()
                .ok_or_else(|| RemoteError::UnknownHandle(entry.name.clone()))?
        };
        tokio::fs::write(local_dest.join(&entry.name), bytes).await?;
        Ok(())
    }
}

/// Recorded notification
#[derive(Debug, Clone)]
pub struct NotifyCall {
    pub job_id: JobId,
    pub old_state: JobState,
    pub new_state: JobState,
}

#[derive(Default)]
struct FakeNotifyState {
    calls: Vec<NotifyCall>,
    fail_next: u32,
}

/// Fake notification sink for testing
#[derive(Clone, Default)]
pub struct FakeNotifySink {
    inner: Arc<Mutex<FakeNotifyState>>,
}

impl FakeNotifySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded notifications
    pub fn calls(&self) -> Vec<NotifyCall> {
        self.inner.lock().calls.clone()
    }

    /// Make the next `count` notify calls fail.
    pub fn fail_next(&self, count: u32) {
        self.inner.lock().fail_next = count;
    }
}

#[async_trait]
impl NotifySink for FakeNotifySink {
    async fn notify(
        &self,
        job_id: &JobId,
        old_state: JobState,
        new_state: JobState,
    ) -> Result<(), NotifyError> {
        let mut state = self.inner.lock();
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(NotifyError::SendFailed("simulated sink failure".to_string()));
        }
        state.calls.push(NotifyCall {
            job_id: job_id.clone(),
            old_state,
            new_state,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
