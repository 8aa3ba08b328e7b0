// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The post-processing collaborator contract (§4.5, §6).

use crate::error::RunnerError;
use crate::ids::InstanceId;
use async_trait::async_trait;
use std::path::Path;

/// Runs after a worker exits, regardless of exit code, against whatever
/// the worker left in `payload_dir` (§4.6 cleanup semantics). Failures
/// here are reported through the same [`RunnerError`] channel as the
/// rest of the job but never change a worker's own exit code (§4.5) —
/// the job runner decides what a post-processing failure means for the
/// job's final state, and never lets it mask an earlier worker failure.
#[async_trait]
pub trait PostProcessor: Send + Sync {
    async fn process(&self, instance_id: &InstanceId, payload_dir: &Path) -> Result<(), RunnerError>;
}

#[cfg(test)]
#[path = "post_processor_tests.rs"]
mod tests;
