// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification sink boundary.
//!
//! Delivery (email, chat, desktop) is supplied by the deployment; the
//! core only calls `notify` and tolerates failure.

use async_trait::async_trait;
use rj_core::{JobId, JobState};
use thiserror::Error;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Sink invoked once per effective state transition.
///
/// Best-effort: a failing sink never rolls back the transition that
/// triggered it.
#[async_trait]
pub trait NotifySink: Clone + Send + Sync + 'static {
    async fn notify(
        &self,
        job_id: &JobId,
        old_state: JobState,
        new_state: JobState,
    ) -> Result<(), NotifyError>;
}

/// Sink that records transitions in the structured log only.
///
/// The default for deployments without a delivery channel configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifySink;

impl LogNotifySink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifySink for LogNotifySink {
    async fn notify(
        &self,
        job_id: &JobId,
        old_state: JobState,
        new_state: JobState,
    ) -> Result<(), NotifyError> {
        tracing::info!(%job_id, old = %old_state, new = %new_state, "job state changed");
        Ok(())
    }
}
