// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle specs
//!
//! A submitted job walks Created → Staged → Submitted → Running → terminal,
//! with one history record and one notification per effective transition.

use crate::specs::prelude::*;

#[tokio::test(start_paused = true)]
async fn job_runs_to_done_with_ordered_history() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();

    h.script_remote_run(&job_id, vec![JobState::Running, JobState::Done]);
    run.join().await;

    let job = h.store.load_job(&job_id).unwrap();
    assert_eq!(job.last_status, JobState::Done);

    let transitions: Vec<_> = h
        .store
        .history(&job_id)
        .unwrap()
        .iter()
        .map(|r| (r.old_state, r.new_state))
        .collect();
    assert_eq!(
        transitions,
        vec![
            (JobState::Created, JobState::Staged),
            (JobState::Staged, JobState::Submitted),
            (JobState::Submitted, JobState::Running),
            (JobState::Running, JobState::Done),
        ]
    );

    // Each record's old state chains from the previous record's new state.
    let history = h.store.history(&job_id).unwrap();
    for pair in history.windows(2) {
        assert_eq!(pair[0].new_state, pair[1].old_state);
    }
    assert_eq!(h.sink.calls().len(), history.len());
}

#[tokio::test(start_paused = true)]
async fn failed_remote_run_lands_in_failed() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();

    h.script_remote_run(&job_id, vec![JobState::Running, JobState::Failed]);
    run.join().await;

    let job = h.store.load_job(&job_id).unwrap();
    assert_eq!(job.last_status, JobState::Failed);
    assert!(job.is_terminal());
}

#[tokio::test(start_paused = true)]
async fn terminal_state_is_absorbing() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();
    h.script_remote_run(&job_id, vec![JobState::Done]);
    run.join().await;

    // A late push callback after completion changes nothing.
    let pid = h.remote_pid(&job_id);
    h.adapter.fire_state_change(&pid, JobState::Failed).await;

    let job = h.store.load_job(&job_id).unwrap();
    assert_eq!(job.last_status, JobState::Done);
}

#[tokio::test(start_paused = true)]
async fn two_jobs_stay_isolated() {
    let h = Harness::new();
    let run_a = h.submit_python_job("alice").await;
    let run_b = h.submit_python_job("bob").await;
    let (id_a, id_b) = (run_a.job_id.clone(), run_b.job_id.clone());
    assert_ne!(id_a, id_b);

    h.script_remote_run(&id_a, vec![JobState::Done]);
    h.script_remote_run(&id_b, vec![JobState::Running, JobState::Failed]);
    run_a.join().await;
    run_b.join().await;

    assert_eq!(h.store.load_job(&id_a).unwrap().last_status, JobState::Done);
    assert_eq!(h.store.load_job(&id_b).unwrap().last_status, JobState::Failed);

    // Staging directories are keyed by owner and job.
    assert!(h.staging_dir.path().join("alice").join(id_a.as_str()).is_dir());
    assert!(h.staging_dir.path().join("bob").join(id_b.as_str()).is_dir());
}

#[tokio::test(start_paused = true)]
async fn stuck_job_is_failed_at_the_lifetime_cap() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();

    // Remote reports Running forever; only the lifetime cap ends it.
    let pid = h.remote_pid(&job_id);
    h.adapter.set_state_sequence(&pid, vec![JobState::Running]);
    run.join().await;

    assert_eq!(h.store.load_job(&job_id).unwrap().last_status, JobState::Failed);
}
