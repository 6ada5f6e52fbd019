// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rj-adapters: Capability boundaries between the orchestration core and
//! the outside world — the remote execution transport and the
//! notification sink.

mod notify;
mod remote;
mod ssh;
pub mod subprocess;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use notify::{LogNotifySink, NotifyError, NotifySink};
pub use remote::{
    JobDescription, RemoteAdapter, RemoteEntry, RemoteError, RemoteHandle, StateObserver,
    WorkspaceHandle,
};
pub use ssh::{SshConfig, SshRemoteAdapter};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifySink, FakeRemoteAdapter, NotifyCall};
