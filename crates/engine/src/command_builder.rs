// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the argv used to launch a worker (§4.2). Deterministic for
//! identical `(job.cfg, paths)` — the pool's fingerprint keying depends
//! on this holding exactly, which is why the produced argv never
//! includes a job-specific payload path. The worker instead finds its
//! payload at its own working directory, which `Launcher` sets to
//! `<procDir>/payload` at spawn time (see `crate::job_runner`).

use crate::config::{ContainerLaunchConfig, RunnerConfig};
use jx_core::{ContainerOptions, DepsManifest, RunnerError, RunnerJob};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The command and extra env produced for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltCommand {
    pub argv: Vec<String>,
    pub env: HashMap<String, String>,
}

pub struct CommandBuilder;

impl CommandBuilder {
    /// Build the launch command for `job` against its resolved
    /// dependency `paths` (§4.2 steps 1-3).
    pub fn build(job: &RunnerJob, paths: &[String], cfg: &RunnerConfig) -> Result<BuiltCommand, RunnerError> {
        let manifest_path = DepsManifest::write(&cfg.manifest_dir, paths)?;

        let mut argv = vec![cfg.java_cmd.clone()];
        argv.push(format!("-Dagent.id={}", cfg.agent_id));
        argv.push(format!("-Dserver.url={}", cfg.server_url));
        if job.debug_mode {
            argv.push("-Ddebug=true".to_string());
        }
        if job.cfg.security_manager {
            argv.push("-Djava.security.manager=allow".to_string());
        }
        argv.push(format!("-Ddeps={}", manifest_path.display()));
        argv.push(cfg.runner_path.clone());

        let mut env = HashMap::new();

        if let Some(opts) = &job.cfg.container {
            let container = cfg
                .container
                .as_ref()
                .ok_or_else(|| RunnerError::LaunchFailure("job requested a container but no container config is set".to_string()))?;
            argv = wrap_for_container(argv, &manifest_path, &cfg.runner_path, container, opts)?;
            env.insert("TMP_DIR".to_string(), "/tmp".to_string());
            env.insert("DOCKER_HOST".to_string(), container.docker_host.clone());
        }

        Ok(BuiltCommand { argv, env })
    }
}

/// Wrap `base` (the uncontainerized argv) with a container-launch argv:
/// mounts the deps list/cache and artifact cache dirs, rewrites the
/// manifest and runner paths to their in-container equivalents (§4.2
/// step 3).
fn wrap_for_container(
    base: Vec<String>,
    manifest_path: &Path,
    runner_path: &str,
    container: &ContainerLaunchConfig,
    opts: &ContainerOptions,
) -> Result<Vec<String>, RunnerError> {
    let manifest_name = manifest_path
        .file_name()
        .ok_or_else(|| RunnerError::LaunchFailure("deps manifest path has no file name".to_string()))?;
    let container_manifest_path: PathBuf = container.container_dependency_list_dir.join(manifest_name);

    let rewritten: Vec<String> = base
        .into_iter()
        .map(|arg| {
            if let Some(_rest) = arg.strip_prefix("-Ddeps=") {
                format!("-Ddeps={}", container_manifest_path.display())
            } else if arg == runner_path {
                container.container_runner_path.clone()
            } else {
                arg
            }
        })
        .collect();

    let mut argv = vec![container.binary.clone(), "run".to_string(), "--rm".to_string()];
    for (host, in_container) in [
        (&container.dependency_list_dir, &container.container_dependency_list_dir),
        (&container.dependency_cache_dir, &container.container_dependency_cache_dir),
        (&container.artifact_cache_dir, &container.container_artifact_cache_dir),
    ] {
        argv.push("-v".to_string());
        argv.push(format!("{}:{}", host.display(), in_container.display()));
    }
    argv.push("-e".to_string());
    argv.push("TMP_DIR=/tmp".to_string());
    argv.push("-e".to_string());
    argv.push(format!("DOCKER_HOST={}", container.docker_host));
    argv.push(opts.image.clone());
    argv.extend(rewritten);
    Ok(argv)
}

#[cfg(test)]
#[path = "command_builder_tests.rs"]
mod tests;
