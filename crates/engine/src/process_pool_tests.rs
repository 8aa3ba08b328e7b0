// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use jx_core::FakeClock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio::process::Command;

async fn spawn_alive(fingerprint: Fingerprint, clock: &FakeClock) -> ProcessEntry {
    let dir = tempdir().unwrap();
    let child = Command::new("sleep").arg("30").kill_on_drop(true).spawn().unwrap();
    ProcessEntry::new(child, dir.into_path(), fingerprint, clock.now())
}

async fn spawn_exited(fingerprint: Fingerprint, clock: &FakeClock) -> ProcessEntry {
    let dir = tempdir().unwrap();
    let mut child = Command::new("true").spawn().unwrap();
    let _ = child.wait().await;
    ProcessEntry::new(child, dir.into_path(), fingerprint, clock.now())
}

fn fp(tag: &str) -> Fingerprint {
    Fingerprint::of_argv(&[tag])
}

#[tokio::test]
async fn take_reuses_a_warm_entry_for_matching_fingerprint() {
    let clock = FakeClock::new();
    let pool = ProcessPool::new(PoolConfig { max_age_secs: 3600, max_count: 4 }, clock.clone());
    let fingerprint = fp("a");
    pool.prewarm(fingerprint, || async { Ok(spawn_alive(fingerprint, &clock).await) }).await.unwrap();
    assert_eq!(pool.len(), 1);

    let fallback_calls = Arc::new(AtomicUsize::new(0));
    let calls = fallback_calls.clone();
    let _entry = pool
        .take(fingerprint, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(spawn_alive(fingerprint, &clock).await)
        })
        .await
        .unwrap();

    assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    assert_eq!(pool.len(), 0);
}

#[tokio::test]
async fn take_falls_back_to_spawn_when_pool_is_empty() {
    let clock = FakeClock::new();
    let pool = ProcessPool::new(PoolConfig { max_age_secs: 3600, max_count: 4 }, clock.clone());
    let fingerprint = fp("a");

    let fallback_calls = Arc::new(AtomicUsize::new(0));
    let calls = fallback_calls.clone();
    pool.take(fingerprint, || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(spawn_alive(fingerprint, &clock).await)
    })
    .await
    .unwrap();

    assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    assert_eq!(pool.len(), 0);
}

#[tokio::test]
async fn take_skips_an_already_exited_entry_and_falls_back() {
    let clock = FakeClock::new();
    let pool = ProcessPool::new(PoolConfig { max_age_secs: 3600, max_count: 4 }, clock.clone());
    let fingerprint = fp("a");
    pool.prewarm(fingerprint, || async { Ok(spawn_exited(fingerprint, &clock).await) }).await.unwrap();

    let fallback_calls = Arc::new(AtomicUsize::new(0));
    let calls = fallback_calls.clone();
    pool.take(fingerprint, || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(spawn_alive(fingerprint, &clock).await)
    })
    .await
    .unwrap();

    assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn take_evicts_an_aged_out_entry_and_falls_back() {
    let clock = FakeClock::new();
    let pool = ProcessPool::new(PoolConfig { max_age_secs: 60, max_count: 4 }, clock.clone());
    let fingerprint = fp("a");
    pool.prewarm(fingerprint, || async { Ok(spawn_alive(fingerprint, &clock).await) }).await.unwrap();
    clock.advance(Duration::from_secs(61));

    let fallback_calls = Arc::new(AtomicUsize::new(0));
    let calls = fallback_calls.clone();
    pool.take(fingerprint, || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(spawn_alive(fingerprint, &clock).await)
    })
    .await
    .unwrap();

    assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    assert_eq!(pool.len(), 0);
}

#[tokio::test]
async fn prewarm_evicts_the_oldest_entry_once_at_capacity() {
    let clock = FakeClock::new();
    let pool = ProcessPool::new(PoolConfig { max_age_secs: 3600, max_count: 1 }, clock.clone());
    let fp_a = fp("a");
    let fp_b = fp("b");

    pool.prewarm(fp_a, || async { Ok(spawn_alive(fp_a, &clock).await) }).await.unwrap();
    clock.advance(Duration::from_secs(1));
    pool.prewarm(fp_b, || async { Ok(spawn_alive(fp_b, &clock).await) }).await.unwrap();

    assert_eq!(pool.len(), 1);

    let fallback_calls = Arc::new(AtomicUsize::new(0));
    let calls = fallback_calls.clone();
    pool.take(fp_a, || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(spawn_alive(fp_a, &clock).await)
    })
    .await
    .unwrap();
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 1, "the older entry for fp_a should have been evicted");
}

#[tokio::test]
async fn prewarm_is_a_noop_when_max_count_is_zero() {
    let clock = FakeClock::new();
    let pool = ProcessPool::new(PoolConfig { max_age_secs: 3600, max_count: 0 }, clock.clone());
    let fingerprint = fp("a");

    let spawn_calls = Arc::new(AtomicUsize::new(0));
    let calls = spawn_calls.clone();
    pool.prewarm(fingerprint, || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(spawn_alive(fingerprint, &clock).await)
    })
    .await
    .unwrap();

    assert_eq!(spawn_calls.load(Ordering::SeqCst), 0);
    assert_eq!(pool.len(), 0);
}
