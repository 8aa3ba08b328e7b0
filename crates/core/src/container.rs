// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container launch options carried on a job's config mapping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Container runtime options for a job, when present on
/// `JobRequest.cfg`. Presence of this struct (a non-empty mapping, per
/// §4.2 step 3) routes `CommandBuilder` through the container-wrap path
/// and forces `JobRunner::can_use_prefork` to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerOptions {
    /// Container image (e.g., `"concord/agent:latest"`).
    pub image: String,
    /// Additional provider-specific options, passed through untouched.
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl ContainerOptions {
    pub fn new(image: impl Into<String>) -> Self {
        Self { image: image.into(), extra: HashMap::new() }
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
