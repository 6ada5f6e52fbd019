// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Push-side reconciliation: adapter state callbacks into the state machine.

use crate::machine::StateMachine;
use async_trait::async_trait;
use rj_adapters::{NotifySink, StateObserver};
use rj_core::{Clock, JobId, JobState};
use rj_storage::JobStore;

/// Forwards adapter state-change callbacks into the state machine.
///
/// One observer per submitted job. The callback runs on the adapter's
/// context, concurrently with the poll monitor; the machine's guard makes
/// the duplicate report harmless.
pub struct PushObserver<S, N, C> {
    job_id: JobId,
    machine: StateMachine<S, N, C>,
}

impl<S, N, C> PushObserver<S, N, C> {
    pub fn new(job_id: JobId, machine: StateMachine<S, N, C>) -> Self {
        Self { job_id, machine }
    }
}

#[async_trait]
impl<S, N, C> StateObserver for PushObserver<S, N, C>
where
    S: JobStore,
    N: NotifySink,
    C: Clock,
{
    async fn state_changed(&self, state: JobState) {
        if let Err(e) = self.machine.transition(&self.job_id, state).await {
            tracing::warn!(job_id = %self.job_id, %state, error = %e, "push transition failed");
        }
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
