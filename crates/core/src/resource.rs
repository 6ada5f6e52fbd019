// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote compute resource descriptor.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a configured remote resource.
    pub struct ResourceId("res-");
}

/// Remote endpoint descriptor.
///
/// Read-only from the core's perspective; ownership of the record (admin
/// CRUD, validation) lives with the configuration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    /// Host address the remote adapter connects to (e.g. `hpc.example.org`).
    pub url: String,
}

impl Resource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { id: ResourceId::new(), name: name.into(), url: url.into() }
    }
}
