// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staging file records.

use crate::job::JobId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Role of a staged file within a job's file set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    /// The single executable script for the job.
    Script,
    /// Input data uploaded alongside the script.
    Input,
    /// File produced by the remote run.
    Output,
    /// The declared stderr capture file.
    Error,
}

crate::simple_display! {
    FileRole {
        Script => "script",
        Input => "input",
        Output => "output",
        Error => "error",
    }
}

/// Record of one physical file staged into or out of a job workspace.
///
/// Records are append-only within a job's file set: downloading an output
/// creates a new record, never rewrites an uploaded one. The checksum is
/// computed over the exact bytes persisted at `location` and never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingFile {
    pub name: String,
    pub original_name: String,
    /// Hex SHA-256 of the bytes at `location/name`.
    pub checksum: String,
    /// Directory holding the physical file.
    pub location: PathBuf,
    pub role: FileRole,
    pub job_id: JobId,
}

impl StagingFile {
    /// Absolute path of the physical file.
    pub fn path(&self) -> PathBuf {
        self.location.join(&self.name)
    }
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
