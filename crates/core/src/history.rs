// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state transition audit trail.

use crate::job::{JobId, JobState};
use serde::{Deserialize, Serialize};

/// Immutable record of one effective state transition.
///
/// One record exists per transition that actually won the store's
/// compare-and-set guard; losing proposals leave no record. This is the
/// only source of truth for "has this transition already been recorded".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStateHistory {
    pub job_id: JobId,
    pub old_state: JobState,
    pub new_state: JobState,
    pub changed_at_epoch_ms: u64,
}

impl JobStateHistory {
    pub fn new(
        job_id: JobId,
        old_state: JobState,
        new_state: JobState,
        changed_at_epoch_ms: u64,
    ) -> Self {
        Self { job_id, old_state, new_state, changed_at_epoch_ms }
    }
}
