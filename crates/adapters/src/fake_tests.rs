// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rj_core::ScriptKind;

async fn submitted(adapter: &FakeRemoteAdapter) -> (WorkspaceHandle, RemoteHandle) {
    let ws = adapter.open_workspace("host", "/remote/job-1").await.unwrap();
    let desc = JobDescription::for_script(ScriptKind::Shell, "run.sh", "/remote/job-1");
    let handle = adapter.submit(&ws, &desc).await.unwrap();
    (ws, handle)
}

#[tokio::test]
async fn open_workspace_is_idempotent() {
    let adapter = FakeRemoteAdapter::new();
    let first = adapter.open_workspace("host", "/remote/job-1").await.unwrap();
    let second = adapter.open_workspace("host", "/remote/job-1").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(adapter.open_count("/remote/job-1"), 2);
}

#[tokio::test]
async fn scripted_states_advance_and_hold() {
    let adapter = FakeRemoteAdapter::new();
    let (_ws, handle) = submitted(&adapter).await;
    adapter.set_state_sequence(&handle.id, vec![JobState::Running, JobState::Done]);

    assert_eq!(adapter.query_state(&handle).await.unwrap(), JobState::Running);
    assert_eq!(adapter.query_state(&handle).await.unwrap(), JobState::Done);
    // Last state repeats
    assert_eq!(adapter.query_state(&handle).await.unwrap(), JobState::Done);
}

#[tokio::test]
async fn transient_query_failures_then_recover() {
    let adapter = FakeRemoteAdapter::new();
    let (_ws, handle) = submitted(&adapter).await;
    adapter.fail_next_queries(&handle.id, 2);

    assert!(adapter.query_state(&handle).await.is_err());
    assert!(adapter.query_state(&handle).await.is_err());
    assert!(adapter.query_state(&handle).await.is_ok());
}

#[tokio::test]
async fn scripted_submit_failure_then_recovery() {
    let adapter = FakeRemoteAdapter::new();
    let ws = adapter.open_workspace("host", "/remote/job-1").await.unwrap();
    let desc = JobDescription::for_script(ScriptKind::Shell, "run.sh", "/remote/job-1");
    adapter.fail_next_submits(1);

    let err = adapter.submit(&ws, &desc).await.unwrap_err();
    assert!(matches!(err, RemoteError::CommandFailed { .. }));
    assert!(adapter.submissions().is_empty());

    let handle = adapter.submit(&ws, &desc).await.unwrap();
    assert_eq!(handle.id, "fake-pid-1");
}

#[tokio::test]
async fn upload_and_copy_back_round_trip() {
    let adapter = FakeRemoteAdapter::new();
    let ws = adapter.open_workspace("host", "/remote/job-1").await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("data.csv");
    tokio::fs::write(&local, b"a,b,c").await.unwrap();
    adapter.upload_file(&local, &ws).await.unwrap();

    let entries = adapter.list_workspace_entries(&ws).await.unwrap();
    assert_eq!(entries, vec![RemoteEntry { name: "data.csv".to_string() }]);

    let dest = dir.path().join("back");
    tokio::fs::create_dir(&dest).await.unwrap();
    adapter.copy_from_workspace(&ws, &entries[0], &dest).await.unwrap();
    let bytes = tokio::fs::read(dest.join("data.csv")).await.unwrap();
    assert_eq!(bytes, b"a,b,c");
}

#[tokio::test]
async fn observers_receive_fired_changes() {
    use async_trait::async_trait;

    struct Recorder(Mutex<Vec<JobState>>);

    #[async_trait]
    impl StateObserver for Recorder {
        async fn state_changed(&self, state: JobState) {
            self.0.lock().push(state);
        }
    }

    let adapter = FakeRemoteAdapter::new();
    let (_ws, handle) = submitted(&adapter).await;
    let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
    adapter.register_state_observer(&handle, recorder.clone()).await.unwrap();

    adapter.fire_state_change(&handle.id, JobState::Running).await;
    adapter.fire_state_change(&handle.id, JobState::Done).await;

    assert_eq!(*recorder.0.lock(), vec![JobState::Running, JobState::Done]);
}

#[tokio::test]
async fn fake_sink_records_and_fails_on_demand() {
    let sink = FakeNotifySink::new();
    let id = JobId::from_string("job-1");

    sink.fail_next(1);
    assert!(sink.notify(&id, JobState::Running, JobState::Done).await.is_err());
    sink.notify(&id, JobState::Running, JobState::Done).await.unwrap();

    let calls = sink.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].new_state, JobState::Done);
}
