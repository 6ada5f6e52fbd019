// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rj-engine: Job execution orchestration core.
//!
//! Composes the staging manager, state machine, and reconciliation
//! monitor per job: build job description, upload inputs, submit, wire
//! up reconciliation, await terminal state, retrieve outputs.

mod error;
mod machine;
mod monitor;
mod observer;
mod orchestrator;
mod staging;

pub use error::{EngineError, StagingError};
pub use machine::{StateMachine, Transition};
pub use monitor::{JobMonitor, MonitorConfig};
pub use observer::PushObserver;
pub use orchestrator::{JobRun, Orchestrator, OrchestratorConfig};
pub use staging::{InputFile, StagingManager};
