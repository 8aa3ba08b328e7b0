// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `ProcessLog` sink contract (§3, §4.5, §6).
//!
//! A `ProcessLog` is handed to a job before the in-process log file
//! exists, so it must be usable immediately for `info`/`error` and only
//! later asked to drain a worker's byte stream and pump it upstream.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A log sink for one job. Implementations ship bytes upstream in
/// whatever wire format the control plane expects (out of scope here,
/// per §1 non-goals) — this crate only needs the four operations below.
#[async_trait]
pub trait ProcessLog: Send + Sync {
    /// Record an informational line.
    async fn info(&self, message: &str);

    /// Record an error line.
    async fn error(&self, message: &str);

    /// Drain `bytes` and persist them to the local log store.
    async fn log(&self, bytes: &[u8]);

    /// Long-running pump: read persisted log bytes and ship them
    /// upstream in a loop until `should_stop` reports true.
    ///
    /// Implementations must poll `should_stop` themselves (it is not a
    /// future) so they can interleave it with their own I/O wait points.
    async fn run(&self, should_stop: Arc<StopFlag>);

    /// Discard local log storage. Must only be called after the pump
    /// driving `run` has stopped (§5 ordering guarantee).
    async fn delete(&self);
}

/// A synchronized boolean flag used to stop a running [`ProcessLog::run`]
/// loop. Plain `bool` is explicitly ruled out by §9's open question —
/// the source's mutable flag was not synchronized.
#[derive(Default)]
pub struct StopFlag(AtomicBool);

impl StopFlag {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "process_log_tests.rs"]
mod tests;
