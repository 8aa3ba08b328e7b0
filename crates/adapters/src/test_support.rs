// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake collaborator implementations shared by this crate's own tests
//! and `jx-engine`'s, gated behind `test-support` the way `oj-adapters`
//! gates its own `Fake*` exports.

use async_trait::async_trait;
use jx_core::{ArtifactResolver, InstanceId, PostProcessor, ProcessLog, ResolvedArtifact, RunnerError, StopFlag};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Resolves every URI to a deterministic path under a fake artifact
/// cache, without touching the network.
#[derive(Default)]
pub struct FakeArtifactResolver;

#[async_trait]
impl ArtifactResolver for FakeArtifactResolver {
    async fn resolve(&self, uris: &BTreeSet<String>) -> Result<Vec<ResolvedArtifact>, RunnerError> {
        Ok(uris
            .iter()
            .map(|uri| {
                let sanitized: String = uri.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect();
                ResolvedArtifact::new(uri.clone(), format!("/fake/artifacts/{sanitized}"))
            })
            .collect())
    }
}

/// Records every invocation; fails if `fail` is set, so tests can
/// exercise `PostProcessingFailure` propagation.
#[derive(Default)]
pub struct FakePostProcessor {
    pub calls: Mutex<Vec<(InstanceId, PathBuf)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl PostProcessor for FakePostProcessor {
    async fn process(&self, instance_id: &InstanceId, payload_dir: &Path) -> Result<(), RunnerError> {
        self.calls.lock().push((*instance_id, payload_dir.to_path_buf()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(RunnerError::PostProcessingFailure("fake post-processor failure".into()));
        }
        Ok(())
    }
}

/// In-memory `ProcessLog` for tests that don't care about the on-disk
/// format `FsProcessLog` persists to.
#[derive(Default)]
pub struct FakeProcessLog {
    pub info_lines: Mutex<Vec<String>>,
    pub error_lines: Mutex<Vec<String>>,
    pub bytes: Mutex<Vec<u8>>,
    pub deleted: AtomicBool,
    /// When true, `run` ignores the stop signal forever, for exercising
    /// `LogPump::stop`'s timeout path.
    pub hang: AtomicBool,
}

#[async_trait]
impl ProcessLog for FakeProcessLog {
    async fn info(&self, message: &str) {
        self.info_lines.lock().push(message.to_string());
    }

    async fn error(&self, message: &str) {
        self.error_lines.lock().push(message.to_string());
    }

    async fn log(&self, bytes: &[u8]) {
        self.bytes.lock().extend_from_slice(bytes);
    }

    async fn run(&self, should_stop: Arc<StopFlag>) {
        loop {
            if !self.hang.load(Ordering::SeqCst) && should_stop.is_set() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }

    async fn delete(&self) {
        self.deleted.store(true, Ordering::SeqCst);
    }
}
