// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain configuration structs constructed by the embedding application
//! (§0 ambient stack). This crate never parses a config file itself —
//! callers load TOML/JSON/env into these via `serde::Deserialize` and
//! hand the result to [`crate::process_pool::ProcessPool`] and
//! [`crate::command_builder::CommandBuilder`].

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Warm-process pool sizing (§4.3).
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Maximum age, in seconds, a pooled entry may reach before `take`
    /// evicts it lazily.
    pub max_age_secs: u64,
    /// Maximum number of warm entries held across all fingerprints.
    /// `0` disables pre-forking entirely (§8 boundary behavior).
    pub max_count: usize,
}

impl PoolConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

/// Everything `CommandBuilder` needs to produce a deterministic argv
/// for the non-containerized case (§4.2 step 2).
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Path or name of the JVM binary (`javaCmd` in the spec).
    pub java_cmd: String,
    /// Path to the worker's runner entry point (`runnerPath`).
    pub runner_path: String,
    pub agent_id: String,
    pub server_url: String,
    /// Directory deps manifests are written under (host-local).
    pub manifest_dir: PathBuf,
    /// Present only when containerized launches are configured; absence
    /// means a job with container options in its own config fails command
    /// construction rather than silently launching uncontained.
    pub container: Option<ContainerLaunchConfig>,
}

/// Shared (agent-wide) container-launch mount/env configuration. A
/// job's own `ContainerOptions` supplies only the image; everything
/// else here is constant across containerized launches on this agent
/// (§4.2 step 3).
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerLaunchConfig {
    /// Container runtime binary, e.g. `"docker"`.
    pub binary: String,
    pub dependency_list_dir: PathBuf,
    pub dependency_cache_dir: PathBuf,
    pub artifact_cache_dir: PathBuf,
    pub container_dependency_list_dir: PathBuf,
    pub container_dependency_cache_dir: PathBuf,
    pub container_artifact_cache_dir: PathBuf,
    pub container_runner_path: String,
    pub docker_host: String,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
