// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rj-core: Domain types for the remjob orchestration core

pub mod macros;

pub mod clock;
pub mod history;
pub mod id;
pub mod job;
pub mod resource;
pub mod staging;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use history::JobStateHistory;
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{Job, JobConfig, JobConfigBuilder, JobId, JobState, ScriptKind};
pub use resource::{Resource, ResourceId};
pub use staging::{FileRole, StagingFile};
