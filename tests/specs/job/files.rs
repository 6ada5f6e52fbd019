// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File staging and retrieval specs
//!
//! Inputs land in the per-owner staging tree with checksums; outputs are
//! mirrored back after the terminal state and classified by role.

use crate::specs::prelude::*;

#[tokio::test(start_paused = true)]
async fn inputs_are_staged_and_uploaded() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();
    run.cancel();
    run.join().await;

    let staged = h.store.query_staging_files(&job_id, None).unwrap();
    let mut names: Vec<_> = staged.iter().map(|f| f.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["data.csv", "job.py"]);
    for file in &staged {
        assert!(file.path().is_file());
        assert_eq!(file.checksum.len(), 64);
    }

    let uploads = h.adapter.uploads();
    assert_eq!(uploads.len(), 2);
    assert!(uploads.iter().all(|(_, remote)| *remote == h.remote_path(&job_id)));
}

#[tokio::test(start_paused = true)]
async fn outputs_come_back_classified_after_completion() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();

    h.script_remote_run(&job_id, vec![JobState::Done]);
    // The job also wrote an undeclared artifact.
    h.adapter
        .put_remote_file(&h.remote_path(&job_id), "result.dat", b"\x00\x01");
    run.join().await;

    let outputs = h.store.query_staging_files(&job_id, Some(FileRole::Output)).unwrap();
    let mut names: Vec<_> = outputs.iter().map(|f| f.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["job.py.out", "result.dat"]);

    let errors = h.store.query_staging_files(&job_id, Some(FileRole::Error)).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].name, "job.py.err");

    // Uploaded inputs are not re-downloaded as outputs.
    assert!(outputs.iter().all(|f| f.name != "data.csv" && f.name != "job.py"));

    let local = h
        .staging_dir
        .path()
        .join("alice")
        .join(job_id.as_str())
        .join("job.py.out");
    assert_eq!(std::fs::read(local).unwrap(), b"hi\n");
}

#[tokio::test(start_paused = true)]
async fn staged_files_are_locatable_by_name() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();
    run.cancel();
    run.join().await;

    let staging = StagingManager::new(h.store.clone(), h.staging_dir.path());
    let location = staging.resolve_file_location(&job_id, "data.csv").unwrap();
    assert_eq!(location, h.staging_dir.path().join("alice").join(job_id.as_str()));

    let err = staging.resolve_file_location(&job_id, "nope.txt").unwrap_err();
    assert!(matches!(err, StagingError::FileNotFound { .. }));
}

#[tokio::test(start_paused = true)]
async fn malformed_inputs_fail_the_submission_unless_silent() {
    let h = Harness::new();
    let bad = InputFile { name: None, content: None, role: Some(FileRole::Input) };

    let err = h
        .orchestrator
        .run_job(
            h.job_config("alice"),
            &h.resource,
            vec![InputFile::new("job.py", "", FileRole::Script), bad.clone()],
            false,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Staging(StagingError::InvalidInput(_))));

    let run = h
        .orchestrator
        .run_job(
            h.job_config("alice"),
            &h.resource,
            vec![InputFile::new("job.py", "", FileRole::Script), bad],
            true,
        )
        .await
        .unwrap();
    run.cancel();
    run.join().await;
}
