// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The warm-worker pool (§4.3): a multimap from launch-command
//! fingerprint to a FIFO queue of pre-forked [`ProcessEntry`] values.

use crate::config::PoolConfig;
use jx_adapters::ProcessEntry;
use jx_core::{Clock, Fingerprint, RunnerError};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::future::Future;

/// Keeps up to `max_count` warm [`ProcessEntry`] values across all
/// fingerprints, evicting the oldest once at capacity and lazily
/// evicting anything older than `max_age` as it's encountered.
pub struct ProcessPool<C: Clock = jx_core::SystemClock> {
    cfg: PoolConfig,
    clock: C,
    queues: Mutex<HashMap<Fingerprint, VecDeque<ProcessEntry>>>,
}

impl<C: Clock> ProcessPool<C> {
    pub fn new(cfg: PoolConfig, clock: C) -> Self {
        Self { cfg, clock, queues: Mutex::new(HashMap::new()) }
    }

    /// Total live entries across all fingerprints. Used by tests and by
    /// `prewarm`'s admission check; never exceeds `max_count` (§8).
    pub fn len(&self) -> usize {
        self.queues.lock().values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pop the oldest eligible entry for `fingerprint`, evicting
    /// anything stale or dead along the way, falling back to `spawn()`
    /// when nothing reusable is queued. A spawned fallback entry is
    /// never inserted into the pool (§4.3 "take").
    pub async fn take<F, Fut>(&self, fingerprint: Fingerprint, spawn: F) -> Result<ProcessEntry, RunnerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ProcessEntry, RunnerError>>,
    {
        if let Some(entry) = self.pop_eligible(fingerprint).await {
            return Ok(entry);
        }
        spawn().await
    }

    async fn pop_eligible(&self, fingerprint: Fingerprint) -> Option<ProcessEntry> {
        let max_age = self.cfg.max_age();
        loop {
            let candidate = {
                let mut queues = self.queues.lock();
                queues.get_mut(&fingerprint).and_then(VecDeque::pop_front)
            };
            let mut entry = candidate?;

            if entry.has_exited() {
                continue;
            }
            if entry.age(self.clock.now()) >= max_age {
                let _ = entry.remove_dir().await;
                let _ = entry.child.start_kill();
                continue;
            }
            return Some(entry);
        }
    }

    /// Insert a freshly spawned entry for future reuse, evicting the
    /// globally oldest entry first if the pool is already at capacity.
    /// A no-op when `max_count == 0` (§8 "disables pre-forking").
    pub async fn prewarm<F, Fut>(&self, fingerprint: Fingerprint, spawn: F) -> Result<(), RunnerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ProcessEntry, RunnerError>>,
    {
        if self.cfg.max_count == 0 {
            return Ok(());
        }

        if self.len() >= self.cfg.max_count {
            self.evict_oldest().await;
        }

        let entry = spawn().await?;
        self.queues.lock().entry(fingerprint).or_default().push_back(entry);
        Ok(())
    }

    async fn evict_oldest(&self) {
        let victim = {
            let mut queues = self.queues.lock();
            let oldest_key = queues
                .iter()
                .filter(|(_, q)| !q.is_empty())
                .min_by_key(|(_, q)| q.front().map(|e| e.created_at))
                .map(|(k, _)| *k);
            oldest_key.and_then(|key| queues.get_mut(&key).and_then(VecDeque::pop_front))
        };
        if let Some(entry) = victim {
            let _ = entry.remove_dir().await;
            let _ = entry.child.start_kill();
        }
    }
}

#[cfg(test)]
#[path = "process_pool_tests.rs"]
mod tests;
