// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process launcher (§4.4).

use crate::process_entry::{prepare_proc_dir, ProcessEntry};
use jx_core::Fingerprint;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tokio::process::Command;

/// Env var pointing a worker at its agent-local temp dir.
pub const TMP_DIR_VAR: &str = "TMP_DIR";

/// Env var pointing a worker at its job-attachments directory.
pub const ATTACHMENTS_DIR_VAR: &str = "_CONCORD_ATTACHMENTS_DIR";

/// Env var carrying the container-local-mode flag, passed through from
/// the agent's own environment when present (§4.4).
pub const DOCKER_LOCAL_MODE_VAR: &str = "DOCKER_LOCAL_MODE";

/// Creates `<procDir>/payload/` and starts the OS process described by
/// `argv`, wiring the two job env vars (§4.4). Stderr is captured on its
/// own piped handle rather than duplicated onto the stdout file
/// descriptor — [`crate::fs_process_log`] interleaves the two streams
/// into one sink, which gets §4.4's "merged into stdout" behavior
/// without reaching for an unsafe `pre_exec` fd dup.
pub struct Launcher {
    /// Root directory new `procDir`s are created under (one per launch).
    pub proc_root: std::path::PathBuf,
}

impl Launcher {
    pub fn new(proc_root: impl Into<std::path::PathBuf>) -> Self {
        Self { proc_root: proc_root.into() }
    }

    /// Launch a worker for `argv`, returning a fresh [`ProcessEntry`].
    pub async fn launch(&self, argv: &[String], fingerprint: Fingerprint) -> std::io::Result<ProcessEntry> {
        let proc_dir = prepare_proc_dir(&self.proc_root).await?;
        let payload_dir = proc_dir.join("payload");
        let child = spawn(argv, &payload_dir, &proc_dir)?;
        Ok(ProcessEntry::new(child, proc_dir, fingerprint, Instant::now()))
    }
}

fn spawn(argv: &[String], payload_dir: &Path, proc_dir: &Path) -> std::io::Result<tokio::process::Child> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty launch command"))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(payload_dir)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .env(TMP_DIR_VAR, proc_dir)
        .env(ATTACHMENTS_DIR_VAR, payload_dir.join("job-attachments"));

    if let Ok(local_mode) = std::env::var(DOCKER_LOCAL_MODE_VAR) {
        cmd.env(DOCKER_LOCAL_MODE_VAR, local_mode);
    }

    cmd.spawn()
}

/// Env vars a worker is launched with, for callers that need to inspect
/// them without re-deriving the launcher's own logic (e.g. tests).
pub fn worker_env(proc_dir: &Path, payload_dir: &Path) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert(TMP_DIR_VAR.to_string(), proc_dir.display().to_string());
    env.insert(ATTACHMENTS_DIR_VAR.to_string(), payload_dir.join("job-attachments").display().to_string());
    env
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
