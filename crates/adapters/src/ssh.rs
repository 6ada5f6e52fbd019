// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSH/SFTP-backed remote execution adapter.
//!
//! Drives stock `ssh` and `scp` subprocesses rather than linking a
//! protocol library: every operation is one short-lived process with a
//! timeout. Job completion is detected through an exit-code marker file
//! written next to the job's output, since a plain SSH target has no
//! scheduler to ask.

use crate::remote::{
    JobDescription, RemoteAdapter, RemoteEntry, RemoteError, RemoteHandle, StateObserver,
    WorkspaceHandle,
};
use crate::subprocess::{
    check_success, run_with_timeout, SSH_CONTROL_TIMEOUT, SSH_TRANSFER_TIMEOUT,
};
use async_trait::async_trait;
use rj_core::JobState;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// Marker file holding the remote process exit code once it finishes.
const RC_FILE: &str = ".rj_rc";

/// Poll interval for the adapter-internal observer watcher.
const OBSERVER_POLL: Duration = Duration::from_secs(3);

/// Connection parameters applied to every ssh/scp invocation.
#[derive(Debug, Clone, Default)]
pub struct SshConfig {
    /// Login user; defaults to the current user when `None`.
    pub user: Option<String>,
    pub port: Option<u16>,
    /// Identity file passed as `-i`.
    pub identity_file: Option<String>,
    /// Extra `-o` options (e.g. `BatchMode=yes`).
    pub options: Vec<String>,
}

impl SshConfig {
    fn target(&self, resource_url: &str) -> String {
        match &self.user {
            Some(user) => format!("{user}@{resource_url}"),
            None => resource_url.to_string(),
        }
    }

    fn apply(&self, cmd: &mut Command, port_flag: &str) {
        if let Some(port) = self.port {
            cmd.arg(port_flag).arg(port.to_string());
        }
        if let Some(identity) = &self.identity_file {
            cmd.arg("-i").arg(identity);
        }
        for opt in &self.options {
            cmd.arg("-o").arg(opt);
        }
    }
}

/// `RemoteAdapter` implementation over ssh/scp subprocesses.
#[derive(Clone, Default)]
pub struct SshRemoteAdapter {
    config: SshConfig,
}

impl SshRemoteAdapter {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    fn ssh_command(&self, resource_url: &str, remote_command: &str) -> Command {
        let mut cmd = Command::new("ssh");
        self.config.apply(&mut cmd, "-p");
        cmd.arg(self.config.target(resource_url)).arg(remote_command);
        cmd
    }

    async fn run_remote(
        &self,
        resource_url: &str,
        remote_command: &str,
        what: &str,
    ) -> Result<String, RemoteError> {
        tracing::debug!(host = resource_url, command = remote_command, what, "ssh exec");
        let output = run_with_timeout(
            self.ssh_command(resource_url, remote_command),
            SSH_CONTROL_TIMEOUT,
            what,
        )
        .await?;
        check_success(&output, what)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl RemoteAdapter for SshRemoteAdapter {
    async fn open_workspace(
        &self,
        resource_url: &str,
        remote_path: &str,
    ) -> Result<WorkspaceHandle, RemoteError> {
        // mkdir -p: creates parents, succeeds on an existing path
        self.run_remote(
            resource_url,
            &format!("mkdir -p '{remote_path}'"),
            "open workspace",
        )
        .await?;
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
        let mut cmd = Command::new("scp");
        self.config.apply(&mut cmd, "-P");
        cmd.arg(local).arg(format!(
            "{}:{}/",
            self.config.target(&workspace.resource_url),
            workspace.remote_path
        ));
        tracing::debug!(
            local = %local.display(),
            remote = %workspace.remote_path,
            "uploading file"
        );
        let output = run_with_timeout(cmd, SSH_TRANSFER_TIMEOUT, "upload file").await?;
        check_success(&output, "upload file")
    }

    async fn submit(
        &self,
        workspace: &WorkspaceHandle,
        description: &JobDescription,
    ) -> Result<RemoteHandle, RemoteError> {
        let args = description.arguments.join(" ");
        // Run detached; the wrapper records the exit code in the marker
        // file so a later probe can distinguish done from failed.
        let line = format!(
            "cd '{dir}' && rm -f {rc} && nohup sh -c '{exe} {args} > {out} 2> {err}; echo $? > {rc}' >/dev/null 2>&1 & echo $!",
            dir = description.working_directory,
            exe = description.executable,
            out = description.stdout_name,
            err = description.stderr_name,
            rc = RC_FILE,
        );
        let pid = self.run_remote(&workspace.resource_url, &line, "submit job").await?;
        if pid.is_empty() || pid.parse::<u32>().is_err() {
            return Err(RemoteError::CommandFailed {
                what: "submit job".to_string(),
                code: -1,
                stderr: format!("no pid returned: {pid:?}"),
            });
        }
        tracing::info!(host = %workspace.resource_url, pid = %pid, "job submitted");
        Ok(RemoteHandle {
            resource_url: workspace.resource_url.clone(),
            id: pid,
            workdir: description.working_directory.clone(),
        })
    }

    async fn query_state(&self, handle: &RemoteHandle) -> Result<JobState, RemoteError> {
        let probe = format!(
            "if [ -f '{dir}/{rc}' ]; then cat '{dir}/{rc}'; elif kill -0 {pid} 2>/dev/null; then echo RUNNING; else echo GONE; fi",
            dir = handle.workdir,
            rc = RC_FILE,
            pid = handle.id,
        );
        let answer = self.run_remote(&handle.resource_url, &probe, "query state").await?;
        Ok(match answer.as_str() {
            "RUNNING" => JobState::Running,
            // Process vanished without writing the marker: treat as failed
            "GONE" => JobState::Failed,
            "0" => JobState::Done,
            _ => JobState::Failed,
        })
    }

    async fn register_state_observer(
        &self,
        handle: &RemoteHandle,
        observer: Arc<dyn StateObserver>,
    ) -> Result<(), RemoteError> {
        // SSH has no push channel, so the observer contract is honored by
        // an adapter-owned watcher task. From the core's point of view it
        // is still an independent concurrent caller.
        let adapter = self.clone();
        let handle = handle.clone();
        tokio::spawn(async move {
            let mut last: Option<JobState> = None;
            loop {
                tokio::time::sleep(OBSERVER_POLL).await;
                let state = match adapter.query_state(&handle).await {
                    Ok(state) => state,
                    Err(e) => {
                        tracing::debug!(pid = %handle.id, error = %e, "observer probe failed");
                        continue;
                    }
                };
                if last != Some(state) {
                    last = Some(state);
                    observer.state_changed(state).await;
                }
                if state.is_terminal() {
                    break;
                }
            }
        });
        Ok(())
    }

    async fn list_workspace_entries(
        &self,
        workspace: &WorkspaceHandle,
    ) -> Result<Vec<RemoteEntry>, RemoteError> {
        let listing = self
            .run_remote(
                &workspace.resource_url,
                &format!("ls -1 '{}'", workspace.remote_path),
                "list workspace",
            )
            .await?;
        Ok(listing
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != RC_FILE)
            .map(|name| RemoteEntry { name: name.to_string() })
            .collect())
    }

    async fn copy_from_workspace(
        &self,
        workspace: &WorkspaceHandle,
        entry: &RemoteEntry,
        local_dest: &Path,
    ) -> Result<(), RemoteError> {
        let mut cmd = Command::new("scp");
        self.config.apply(&mut cmd, "-P");
        cmd.arg(format!(
            "{}:{}/{}",
            self.config.target(&workspace.resource_url),
            workspace.remote_path,
            entry.name
        ))
        .arg(local_dest);
        tracing::debug!(
            entry = %entry.name,
            dest = %local_dest.display(),
            "downloading file"
        );
        let output = run_with_timeout(cmd, SSH_TRANSFER_TIMEOUT, "download file").await?;
        check_success(&output, "download file")
    }
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
