// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ProcessEntry` — one OS worker process owned by the pool or a
//! one-shot launch (§3 "ProcessEntry").

use jx_core::Fingerprint;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Child;

/// Owns an OS process and the filesystem root it runs in.
///
/// While an entry sits in the pool, no outside holder references it;
/// once taken, ownership transfers exclusively to the caller — this is
/// enforced by the pool's API shape (`take` moves the entry out) rather
/// than by any field on `ProcessEntry` itself.
pub struct ProcessEntry {
    pub child: Child,
    pub proc_dir: PathBuf,
    pub fingerprint: Fingerprint,
    pub created_at: Instant,
}

impl ProcessEntry {
    pub fn new(child: Child, proc_dir: impl Into<PathBuf>, fingerprint: Fingerprint, created_at: Instant) -> Self {
        Self { child, proc_dir: proc_dir.into(), fingerprint, created_at }
    }

    /// `<procDir>/payload` (§6 filesystem layout).
    pub fn payload_dir(&self) -> PathBuf {
        self.proc_dir.join("payload")
    }

    /// True once the OS process has exited, without blocking.
    pub fn has_exited(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(Some(_)))
    }

    pub fn age(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Recursively remove `proc_dir`. Best-effort: callers treat failures
    /// as a `CleanupWarning`, never a fatal error (§7).
    pub async fn remove_dir(&self) -> std::io::Result<()> {
        if tokio::fs::metadata(&self.proc_dir).await.is_ok() {
            tokio::fs::remove_dir_all(&self.proc_dir).await?;
        }
        Ok(())
    }
}

/// Create `<payload_dir>` inside a fresh temp-rooted `proc_dir` (§4.4).
pub async fn prepare_proc_dir(root: &Path) -> std::io::Result<PathBuf> {
    let proc_dir = root.join(format!("proc-{}", nanoid::nanoid!(12)));
    tokio::fs::create_dir_all(proc_dir.join("payload")).await?;
    Ok(proc_dir)
}

#[cfg(test)]
#[path = "process_entry_tests.rs"]
mod tests;
