// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rj-storage: Persistence boundary for jobs, staging files, and the
//! state-transition audit trail.

mod memory;
mod store;

pub use memory::MemoryStore;
pub use store::{JobStore, StoreError, TransitionOutcome};
