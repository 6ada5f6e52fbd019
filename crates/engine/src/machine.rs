// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job state machine: the single authoritative mutation path for
//! `last_status`.

use crate::error::EngineError;
use rj_adapters::NotifySink;
use rj_core::{Clock, JobId, JobState};
use rj_storage::{JobStore, TransitionOutcome};

/// Caller-visible result of a transition proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// This caller won the guard; the record and notification are theirs.
    Applied { old: JobState, new: JobState },
    /// The proposal was a no-op: same state, terminal state, or another
    /// caller already recorded it.
    AlreadyApplied,
}

/// Applies state transitions with at-most-one-effective semantics.
///
/// Both reconciliation paths (push observer and poll monitor) funnel
/// through `transition`; the store's compare-and-set guard totally
/// orders concurrent proposals, so duplicated and racing reports
/// collapse to one history record and one notification.
#[derive(Clone)]
pub struct StateMachine<S, N, C> {
    store: S,
    sink: N,
    clock: C,
}

impl<S, N, C> StateMachine<S, N, C>
where
    S: JobStore,
    N: NotifySink,
    C: Clock,
{
    pub fn new(store: S, sink: N, clock: C) -> Self {
        Self { store, sink, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Propose a new state for a job.
    ///
    /// A proposal equal to the current state, out of a terminal state, or
    /// losing the store guard is silently absorbed as `AlreadyApplied` —
    /// someone else already recorded it, which is not an error.
    ///
    /// On an effective transition the notify sink is invoked after the
    /// write commits; sink failure is logged and never rolls the state
    /// back.
    pub async fn transition(
        &self,
        job_id: &JobId,
        new_state: JobState,
    ) -> Result<Transition, EngineError> {
        let job = self.store.load_job(job_id)?;
        let old = job.last_status;

        if !old.can_transition_to(new_state) {
            tracing::debug!(%job_id, current = %old, proposed = %new_state, "transition no-op");
            return Ok(Transition::AlreadyApplied);
        }

        match self
            .store
            .transition_guarded(job_id, old, new_state, self.clock.epoch_ms())?
        {
            TransitionOutcome::Applied(_) => {
                tracing::info!(%job_id, old = %old, new = %new_state, "job state transition");
                if let Err(e) = self.sink.notify(job_id, old, new_state).await {
                    // State durability takes priority over delivery
                    tracing::warn!(%job_id, error = %e, "notification delivery failed");
                }
                Ok(Transition::Applied { old, new: new_state })
            }
            TransitionOutcome::Conflict { current } => {
                tracing::debug!(
                    %job_id,
                    expected = %old,
                    current = %current,
                    proposed = %new_state,
                    "lost transition guard, treating as already applied"
                );
                Ok(Transition::AlreadyApplied)
            }
        }
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
