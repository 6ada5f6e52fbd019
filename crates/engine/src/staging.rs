// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staging file management: materialize inputs into the local job
//! workspace, checksum them, and mirror remote outputs back.

use crate::error::{EngineError, StagingError};
use rj_adapters::{RemoteAdapter, WorkspaceHandle};
use rj_core::{FileRole, Job, JobId, ScriptKind, StagingFile};
use rj_storage::{JobStore, StoreError};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// One declared input for a job submission.
///
/// Fields are optional so a malformed upload request is representable;
/// `stage_inputs` decides whether that is an error or a skip.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: Option<String>,
    pub content: Option<Vec<u8>>,
    pub role: Option<FileRole>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>, role: FileRole) -> Self {
        Self {
            name: Some(name.into()),
            content: Some(content.into()),
            role: Some(role),
        }
    }

    fn validate(self) -> Option<(String, Vec<u8>, FileRole)> {
        match (self.name, self.content, self.role) {
            (Some(name), Some(content), Some(role)) if !name.is_empty() => {
                Some((name, content, role))
            }
            _ => None,
        }
    }
}

/// Manages the local side of a job's file set.
#[derive(Clone)]
pub struct StagingManager<S> {
    store: S,
    staging_root: PathBuf,
}

impl<S: JobStore> StagingManager<S> {
    pub fn new(store: S, staging_root: impl Into<PathBuf>) -> Self {
        Self { store, staging_root: staging_root.into() }
    }

    /// Local workspace directory for a job: `<staging_root>/<owner>/<job_id>/`.
    pub fn job_dir(&self, job: &Job) -> PathBuf {
        self.staging_root.join(&job.owner).join(job.id.as_str())
    }

    /// Write declared inputs into the job workspace and record them.
    ///
    /// Exactly one input must carry the `Script` role; its bytes are
    /// captured into `job.script` and its extension selects the script
    /// kind. The checksum is computed from the bytes read back off disk,
    /// not the source buffer, so write corruption is caught here.
    ///
    /// In silent mode malformed entries are skipped instead of failing.
    pub async fn stage_inputs(
        &self,
        job: &mut Job,
        files: Vec<InputFile>,
        silent: bool,
    ) -> Result<Vec<StagingFile>, StagingError> {
        let mut declared = Vec::with_capacity(files.len());
        for file in files {
            match file.validate() {
                Some(entry) => declared.push(entry),
                None if silent => {
                    tracing::debug!(job_id = %job.id, "skipping malformed input entry");
                }
                None => {
                    return Err(StagingError::InvalidInput(
                        "file name, content, or role missing".to_string(),
                    ))
                }
            }
        }

        let scripts: Vec<_> = declared
            .iter()
            .filter(|(_, _, role)| *role == FileRole::Script)
            .collect();
        let (script_name, script_bytes) = match scripts.as_slice() {
            [] => return Err(StagingError::MissingScript),
            [(name, bytes, _)] => (name.clone(), bytes.clone()),
            _ => {
                return Err(StagingError::InvalidInput(
                    "more than one script file declared".to_string(),
                ))
            }
        };

        job.script = String::from_utf8_lossy(&script_bytes).into_owned();
        job.script_kind = ScriptKind::from_file_name(&script_name);

        let job_dir = self.job_dir(job);
        tokio::fs::create_dir_all(&job_dir).await?;

        let mut records = Vec::with_capacity(declared.len());
        for (name, bytes, role) in declared {
            let path = job_dir.join(&name);
            tokio::fs::write(&path, &bytes).await?;
            let written = tokio::fs::read(&path).await?;
            let record = StagingFile {
                name: name.clone(),
                original_name: name,
                checksum: checksum(&written),
                location: job_dir.clone(),
                role,
                job_id: job.id.clone(),
            };
            self.store.save_staging_file(&record)?;
            records.push(record);
        }

        tracing::info!(
            job_id = %job.id,
            files = records.len(),
            kind = ?job.script_kind,
            "inputs staged"
        );
        Ok(records)
    }

    /// Locate the directory holding a named file of a job.
    pub fn resolve_file_location(
        &self,
        job_id: &JobId,
        file_name: &str,
    ) -> Result<PathBuf, StagingError> {
        let job = match self.store.load_job(job_id) {
            Ok(job) => job,
            Err(StoreError::JobNotFound(id)) => return Err(StagingError::JobNotFound(id)),
            Err(e) => return Err(StagingError::Store(e)),
        };
        let files = self.store.query_staging_files(&job.id, None)?;
        files
            .into_iter()
            .find(|f| f.name == file_name)
            .map(|f| f.location)
            .ok_or_else(|| StagingError::FileNotFound {
                job_id: job_id.to_string(),
                name: file_name.to_string(),
            })
    }

    /// Mirror remote outputs back into the local job workspace.
    ///
    /// Classification: the declared stdout path is `Output`, the declared
    /// stderr path is `Error`, and any remote entry that was not uploaded
    /// for this job is assumed to be a job-produced `Output`. Entries
    /// matching an uploaded name are skipped — we already hold them.
    pub async fn retrieve_outputs<A: RemoteAdapter>(
        &self,
        job: &Job,
        adapter: &A,
        workspace: &WorkspaceHandle,
        declared_output: &str,
        declared_error: &str,
    ) -> Result<Vec<StagingFile>, EngineError> {
        let uploaded: Vec<String> = self
            .store
            .query_staging_files(&job.id, None)?
            .into_iter()
            .map(|f| f.name)
            .collect();

        let mut classified = Vec::new();
        for entry in adapter.list_workspace_entries(workspace).await? {
            if entry.name == declared_output {
                classified.push((entry, FileRole::Output));
            } else if entry.name == declared_error {
                classified.push((entry, FileRole::Error));
            } else if !uploaded.contains(&entry.name) {
                classified.push((entry, FileRole::Output));
            }
        }

        let job_dir = self.job_dir(job);
        // Idempotent: the directory usually exists from staging
        tokio::fs::create_dir_all(&job_dir).await.map_err(StagingError::Io)?;

        let mut records = Vec::with_capacity(classified.len());
        for (entry, role) in classified {
            adapter.copy_from_workspace(workspace, &entry, &job_dir).await?;
            let local = tokio::fs::read(job_dir.join(&entry.name))
                .await
                .map_err(StagingError::Io)?;
            let record = StagingFile {
                name: entry.name.clone(),
                original_name: entry.name,
                checksum: checksum(&local),
                location: job_dir.clone(),
                role,
                job_id: job.id.clone(),
            };
            self.store.save_staging_file(&record)?;
            records.push(record);
        }

        tracing::info!(job_id = %job.id, files = records.len(), "outputs retrieved");
        Ok(records)
    }
}

/// Hex SHA-256 of a byte slice.
fn checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
