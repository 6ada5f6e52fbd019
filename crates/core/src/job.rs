// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record and state machine definitions.

use crate::clock::Clock;
use crate::resource::ResourceId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a submitted job.
    ///
    /// Allocated once at submission time and used to key the job's
    /// staging directory, history records, and remote workspace.
    pub struct JobId("job-");
}

/// Authoritative job state.
///
/// `Created`, `Staged`, and `Submitted` are transient pre-execution states
/// driven by the orchestrator. `Running` and the terminal states are driven
/// exclusively by state reconciliation (push observer + poll monitor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Created,
    Staged,
    Submitted,
    Running,
    Done,
    Failed,
    Canceled,
}

impl JobState {
    /// Check if the state is terminal (`Done`, `Failed`, or `Canceled`).
    ///
    /// No transition is ever recorded out of a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed | JobState::Canceled)
    }

    /// Whether a transition from `self` to `next` may be recorded.
    ///
    /// Terminal states are absorbing and a state never transitions to
    /// itself; everything else is legal — ordering between the two signal
    /// paths is resolved by the store's compare-and-set guard, not here.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        !self.is_terminal() && *self != next
    }
}

crate::simple_display! {
    JobState {
        Created => "created",
        Staged => "staged",
        Submitted => "submitted",
        Running => "running",
        Done => "done",
        Failed => "failed",
        Canceled => "canceled",
    }
}

/// Kind of user script, selected from the script file's extension.
///
/// Determines the remote executable: `/usr/bin/python` for interpreted
/// scripts, `/bin/sh` for shell scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    Interpreted,
    Shell,
}

impl ScriptKind {
    /// Resolve the kind from a script file name, if recognizable.
    pub fn from_file_name(name: &str) -> Option<ScriptKind> {
        if name.ends_with(".py") {
            Some(ScriptKind::Interpreted)
        } else if name.ends_with("sh") {
            Some(ScriptKind::Shell)
        } else {
            None
        }
    }

    /// Remote executable used to run a script of this kind.
    pub fn executable(&self) -> &'static str {
        match self {
            ScriptKind::Interpreted => "/usr/bin/python",
            ScriptKind::Shell => "/bin/sh",
        }
    }
}

crate::simple_display! {
    ScriptKind {
        Interpreted => "interpreted",
        Shell => "shell",
    }
}

/// Configuration for creating a new job
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub id: JobId,
    pub name: String,
    pub owner: String,
    pub resource_id: ResourceId,
    pub description: Option<String>,
}

impl JobConfig {
    pub fn builder(
        id: impl Into<JobId>,
        owner: impl Into<String>,
        resource_id: impl Into<ResourceId>,
    ) -> JobConfigBuilder {
        let id = id.into();
        JobConfigBuilder {
            name: id.suffix().to_string(),
            id,
            owner: owner.into(),
            resource_id: resource_id.into(),
            description: None,
        }
    }
}

pub struct JobConfigBuilder {
    id: JobId,
    name: String,
    owner: String,
    resource_id: ResourceId,
    description: Option<String>,
}

impl JobConfigBuilder {
    crate::setters! {
        into {
            name: String,
        }
        option {
            description: String,
        }
    }

    pub fn build(self) -> JobConfig {
        JobConfig {
            id: self.id,
            name: self.name,
            owner: self.owner,
            resource_id: self.resource_id,
            description: self.description,
        }
    }
}

/// One user-submitted unit of remote execution work.
///
/// `last_status` is mutated exclusively through the state machine's
/// guarded transition; every other field is written once during staging
/// and submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    /// Owning user reference; keys the local staging directory layout.
    pub owner: String,
    pub resource_id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Embedded script body, captured from the role-`Script` staging file.
    #[serde(default)]
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_kind: Option<ScriptKind>,
    /// Current authoritative state; equals the `new_state` of the most
    /// recent history record, or `Created` if no history exists.
    pub last_status: JobState,
    /// Remote execution handle, stored after submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_pid: Option<String>,
    pub created_at_epoch_ms: u64,
}

impl Job {
    /// Create a new job in the `Created` state.
    pub fn new(config: JobConfig, clock: &impl Clock) -> Self {
        Self::new_with_epoch_ms(config, clock.epoch_ms())
    }

    /// Create a new job with an explicit creation timestamp.
    pub fn new_with_epoch_ms(config: JobConfig, epoch_ms: u64) -> Self {
        Self {
            id: config.id,
            name: config.name,
            owner: config.owner,
            resource_id: config.resource_id,
            description: config.description,
            script: String::new(),
            script_kind: None,
            last_status: JobState::Created,
            remote_pid: None,
            created_at_epoch_ms: epoch_ms,
        }
    }

    /// Check if the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.last_status.is_terminal()
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            id: JobId = "job-test1",
            name: String = "test-job",
            owner: String = "tester",
            resource_id: ResourceId = "res-test1",
            script: String = "",
        }
        set {
            last_status: JobState = JobState::Created,
            created_at_epoch_ms: u64 = 1_000_000,
        }
        option {
            description: String = None,
            script_kind: ScriptKind = None,
            remote_pid: String = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
