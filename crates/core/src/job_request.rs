// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job input types: the caller-facing [`JobRequest`] and the canonical
//! [`RunnerJob`] view the rest of the pipeline operates on (§3).

use crate::container::ContainerOptions;
use crate::ids::InstanceId;
use crate::process_log::ProcessLog;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration carried on a job request: the dependency list, optional
/// container options, and the two sentinel flags `canUsePrefork` reads
/// (§4.6).
#[derive(Debug, Clone, Default)]
pub struct JobConfig {
    pub dependencies: Vec<String>,
    pub container: Option<ContainerOptions>,
    pub debug: bool,
    /// True if the job's config carries the security-manager flag.
    pub security_manager: bool,
}

/// A job as received from the control plane. Immutable once constructed.
pub struct JobRequest {
    pub instance_id: InstanceId,
    pub payload_dir: PathBuf,
    pub cfg: JobConfig,
    pub log: Arc<dyn ProcessLog>,
}

impl JobRequest {
    pub fn new(
        instance_id: InstanceId,
        payload_dir: impl Into<PathBuf>,
        cfg: JobConfig,
        log: Arc<dyn ProcessLog>,
    ) -> Self {
        Self { instance_id, payload_dir: payload_dir.into(), cfg, log }
    }
}

/// The canonical view of a job the execution pipeline operates on,
/// built once from a [`JobRequest`] (§3 "RunnerJob").
pub struct RunnerJob {
    pub instance_id: InstanceId,
    pub payload_dir: PathBuf,
    pub cfg: JobConfig,
    pub debug_mode: bool,
    pub log: Arc<dyn ProcessLog>,
}

impl From<JobRequest> for RunnerJob {
    fn from(request: JobRequest) -> Self {
        let debug_mode = request.cfg.debug;
        Self {
            instance_id: request.instance_id,
            payload_dir: request.payload_dir,
            cfg: request.cfg,
            debug_mode,
            log: request.log,
        }
    }
}

impl RunnerJob {
    /// `payloadDir/lib/` exists — the worker supplies its own library
    /// overrides (§4.6 `canUsePrefork` clause b).
    pub fn payload_has_lib_override(&self) -> bool {
        self.payload_dir.join("lib").is_dir()
    }

    /// `payloadDir/_agent.json` exists — the worker supplies its own JVM
    /// params (§4.6 `canUsePrefork` clause c).
    pub fn payload_has_agent_params(&self) -> bool {
        self.payload_dir.join("_agent.json").is_file()
    }

    /// `payloadDir/.concord/policy.json`, if present (§6 policy engine
    /// collaborator).
    pub fn policy_path(&self) -> PathBuf {
        self.payload_dir.join(".concord").join("policy.json")
    }

    /// True iff the job can be satisfied by a pre-forked warm process
    /// (§4.6 `canUsePrefork` predicate): no container options, no
    /// library override, no agent-params sentinel.
    pub fn can_use_prefork(&self) -> bool {
        self.cfg.container.is_none() && !self.payload_has_lib_override() && !self.payload_has_agent_params()
    }

    /// Path to the payload once adopted by a `ProcessEntry` rooted at
    /// `proc_dir` (§4.3, §6 filesystem layout).
    pub fn adopted_payload_dir(proc_dir: &Path) -> PathBuf {
        proc_dir.join("payload")
    }
}

#[cfg(test)]
#[path = "job_request_tests.rs"]
mod tests;
