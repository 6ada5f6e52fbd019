// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders and proptest strategies shared across crates' tests.

use crate::job::{JobState, ScriptKind};

/// Proptest strategies for domain types.
pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    /// Any job state.
    pub fn job_state() -> impl Strategy<Value = JobState> {
        prop_oneof![
            Just(JobState::Created),
            Just(JobState::Staged),
            Just(JobState::Submitted),
            Just(JobState::Running),
            Just(JobState::Done),
            Just(JobState::Failed),
            Just(JobState::Canceled),
        ]
    }

    /// One of the three terminal states.
    pub fn terminal_state() -> impl Strategy<Value = JobState> {
        prop_oneof![
            Just(JobState::Done),
            Just(JobState::Failed),
            Just(JobState::Canceled),
        ]
    }

    /// A non-terminal state.
    pub fn live_state() -> impl Strategy<Value = JobState> {
        prop_oneof![
            Just(JobState::Created),
            Just(JobState::Staged),
            Just(JobState::Submitted),
            Just(JobState::Running),
        ]
    }

    /// Any script kind.
    pub fn script_kind() -> impl Strategy<Value = ScriptKind> {
        prop_oneof![Just(ScriptKind::Interpreted), Just(ScriptKind::Shell)]
    }
}
