// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with timeouts.

use crate::remote::RemoteError;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Timeout for ssh/scp control operations (mkdir, listing, state probe).
pub const SSH_CONTROL_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for file transfers, which may move real data.
pub const SSH_TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

/// Run a command to completion, killing it if the timeout elapses.
///
/// `what` names the operation for error messages and logs.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    what: &str,
) -> Result<Output, RemoteError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            tracing::warn!(what, timeout_s = timeout.as_secs(), "subprocess timed out");
            Err(RemoteError::Timeout { what: what.to_string(), seconds: timeout.as_secs() })
        }
    }
}

/// Map a non-success `Output` to `RemoteError::CommandFailed`.
pub fn check_success(output: &Output, what: &str) -> Result<(), RemoteError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(RemoteError::CommandFailed {
        what: what.to_string(),
        code: output.status.code().unwrap_or(-1),
        stderr,
    })
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
