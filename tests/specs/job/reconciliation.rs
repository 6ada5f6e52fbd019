// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dual-signal reconciliation specs
//!
//! Push callbacks and the poll monitor report the same remote run; every
//! duplicated or racing report must collapse to one recorded transition.

use crate::specs::prelude::*;

#[tokio::test(start_paused = true)]
async fn push_and_poll_agree_on_one_running_record() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();
    let pid = h.remote_pid(&job_id);
    h.script_remote_run(&job_id, vec![JobState::Running, JobState::Running, JobState::Done]);

    // Push lands before the first poll.
    h.adapter.fire_state_change(&pid, JobState::Running).await;
    assert_eq!(h.store.load_job(&job_id).unwrap().last_status, JobState::Running);

    run.join().await;

    let history = h.store.history(&job_id).unwrap();
    let running_records = history
        .iter()
        .filter(|r| r.new_state == JobState::Running)
        .count();
    assert_eq!(running_records, 1);
    assert_eq!(h.store.load_job(&job_id).unwrap().last_status, JobState::Done);
}

#[tokio::test(start_paused = true)]
async fn duplicate_push_callbacks_notify_once() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();
    let pid = h.remote_pid(&job_id);

    h.adapter.fire_state_change(&pid, JobState::Running).await;
    h.adapter.fire_state_change(&pid, JobState::Running).await;
    h.adapter.fire_state_change(&pid, JobState::Running).await;

    let running_notifications = h
        .sink
        .calls()
        .iter()
        .filter(|c| c.new_state == JobState::Running)
        .count();
    assert_eq!(running_notifications, 1);

    run.cancel();
    run.join().await;
}

#[tokio::test(start_paused = true)]
async fn transient_poll_failures_do_not_fail_the_job() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();
    let pid = h.remote_pid(&job_id);
    h.adapter.fail_next_queries(&pid, 4);
    h.script_remote_run(&job_id, vec![JobState::Running, JobState::Done]);

    run.join().await;

    assert_eq!(h.store.load_job(&job_id).unwrap().last_status, JobState::Done);
}

#[tokio::test(start_paused = true)]
async fn notification_failure_never_blocks_the_run() {
    let h = Harness::new();
    h.sink.fail_next(10);

    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();
    h.script_remote_run(&job_id, vec![JobState::Done]);
    run.join().await;

    assert_eq!(h.store.load_job(&job_id).unwrap().last_status, JobState::Done);
    // Every transition still has its history record.
    assert_eq!(h.store.history(&job_id).unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn direct_guard_conflict_is_a_noop_not_an_error() {
    let h = Harness::new();
    let run = h.submit_python_job("alice").await;
    let job_id = run.job_id.clone();
    run.cancel();
    run.join().await;

    // A stale writer expecting the pre-submission state loses silently.
    let outcome = h
        .store
        .transition_guarded(&job_id, JobState::Created, JobState::Failed, h.clock.epoch_ms())
        .unwrap();
    assert_eq!(
        outcome,
        TransitionOutcome::Conflict { current: JobState::Submitted }
    );
    assert_eq!(h.store.load_job(&job_id).unwrap().last_status, JobState::Submitted);
}
