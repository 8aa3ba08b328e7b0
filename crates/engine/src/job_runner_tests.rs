// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::{PoolConfig, RunnerConfig};
use crate::policy_glob::GlobPolicyEngine;
use jx_adapters::test_support::{FakeArtifactResolver, FakePostProcessor, FakeProcessLog};
use jx_core::{InstanceId, JobConfig, JobRequest, SystemClock};
use parking_lot::Mutex;
use std::os::unix::fs::PermissionsExt;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::tempdir;

fn runner_cfg(manifest_dir: &std::path::Path, java_cmd: &str) -> RunnerConfig {
    RunnerConfig {
        java_cmd: java_cmd.to_string(),
        runner_path: "runner".to_string(),
        agent_id: "agent-1".to_string(),
        server_url: "https://control-plane.example".to_string(),
        manifest_dir: manifest_dir.to_path_buf(),
        container: None,
    }
}

fn make_runner(
    manifest_dir: &std::path::Path,
    proc_root: &std::path::Path,
    java_cmd: &str,
    post_processors: Vec<Arc<dyn PostProcessor>>,
) -> JobRunner {
    let resolver = Arc::new(DependencyResolver::new(vec![], Arc::new(FakeArtifactResolver), Arc::new(GlobPolicyEngine)));
    let pool = Arc::new(ProcessPool::new(PoolConfig { max_age_secs: 3600, max_count: 4 }, SystemClock));
    let launcher = Arc::new(Launcher::new(proc_root));
    JobRunner::new(resolver, pool, launcher, runner_cfg(manifest_dir, java_cmd), post_processors)
}

fn job_with_log(payload_dir: &std::path::Path) -> (RunnerJob, Arc<FakeProcessLog>) {
    let log = Arc::new(FakeProcessLog::default());
    let request = JobRequest::new(InstanceId::new(), payload_dir, JobConfig::default(), log.clone());
    (RunnerJob::from(request), log)
}

/// An executable that ignores every argument it's given, for exercising
/// the runner without a real `java`/worker binary present.
fn sleeper_script(dir: &std::path::Path, seconds: u32) -> std::path::PathBuf {
    let path = dir.join("sleeper.sh");
    std::fs::write(&path, format!("#!/bin/sh\nsleep {seconds}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn prefork_path_copies_payload_and_leaves_the_original_in_place() {
    let manifest_dir = tempdir().unwrap();
    let proc_root = tempdir().unwrap();
    let payload_dir = tempdir().unwrap();
    std::fs::write(payload_dir.path().join("input.txt"), b"hello").unwrap();

    let runner = make_runner(manifest_dir.path(), proc_root.path(), "true", vec![]);
    let (job, _log) = job_with_log(payload_dir.path());
    assert!(job.can_use_prefork());

    let handle = runner.submit(job).await.unwrap();
    handle.wait_for_completion().await.unwrap();

    assert!(payload_dir.path().join("input.txt").is_file(), "prefork must copy, not move, the original payload");
}

#[tokio::test]
async fn one_shot_path_moves_the_payload_and_cleans_it_up() {
    let manifest_dir = tempdir().unwrap();
    let proc_root = tempdir().unwrap();
    let payload_dir = tempdir().unwrap();
    std::fs::create_dir_all(payload_dir.path().join("lib")).unwrap();

    let runner = make_runner(manifest_dir.path(), proc_root.path(), "true", vec![]);
    let (job, _log) = job_with_log(payload_dir.path());
    assert!(!job.can_use_prefork(), "a lib/ override must force the one-shot path");

    let payload_path = payload_dir.into_path();
    let handle = runner.submit(job).await.unwrap();
    handle.wait_for_completion().await.unwrap();

    assert!(!payload_path.exists(), "one-shot must move the original payload dir away and clean it up");
}

#[tokio::test]
async fn a_non_zero_exit_is_reported_as_a_runner_error() {
    let manifest_dir = tempdir().unwrap();
    let proc_root = tempdir().unwrap();
    let payload_dir = tempdir().unwrap();

    let runner = make_runner(manifest_dir.path(), proc_root.path(), "false", vec![]);
    let (job, _log) = job_with_log(payload_dir.path());

    let handle = runner.submit(job).await.unwrap();
    let err = handle.wait_for_completion().await.unwrap_err();
    assert!(matches!(err, RunnerError::NonZeroExit(1)));
}

#[tokio::test]
async fn post_processors_run_after_a_successful_exit() {
    let manifest_dir = tempdir().unwrap();
    let proc_root = tempdir().unwrap();
    let payload_dir = tempdir().unwrap();
    let post_processor = Arc::new(FakePostProcessor::default());

    let runner = make_runner(manifest_dir.path(), proc_root.path(), "true", vec![post_processor.clone()]);
    let (job, _log) = job_with_log(payload_dir.path());

    let handle = runner.submit(job).await.unwrap();
    handle.wait_for_completion().await.unwrap();

    assert_eq!(post_processor.calls.lock().len(), 1);
}

#[tokio::test]
async fn a_failing_post_processor_still_runs_cleanup() {
    let manifest_dir = tempdir().unwrap();
    let proc_root = tempdir().unwrap();
    let payload_dir = tempdir().unwrap();
    let post_processor = Arc::new(FakePostProcessor::default());
    post_processor.fail.store(true, Ordering::SeqCst);

    let runner = make_runner(manifest_dir.path(), proc_root.path(), "true", vec![post_processor]);
    let (job, log) = job_with_log(payload_dir.path());

    let handle = runner.submit(job).await.unwrap();
    let err = handle.wait_for_completion().await.unwrap_err();
    assert!(matches!(err, RunnerError::PostProcessingFailure(_)));
    assert!(log.deleted.load(Ordering::SeqCst), "cleanup must still run after a post-processing failure");
}

#[tokio::test]
async fn post_processors_run_even_after_a_non_zero_exit_without_masking_it() {
    let manifest_dir = tempdir().unwrap();
    let proc_root = tempdir().unwrap();
    let payload_dir = tempdir().unwrap();
    let post_processor = Arc::new(FakePostProcessor::default());

    let runner = make_runner(manifest_dir.path(), proc_root.path(), "false", vec![post_processor.clone()]);
    let (job, _log) = job_with_log(payload_dir.path());

    let handle = runner.submit(job).await.unwrap();
    let err = handle.wait_for_completion().await.unwrap_err();

    assert_eq!(post_processor.calls.lock().len(), 1, "post-processors must still run after a non-zero exit");
    assert!(matches!(err, RunnerError::NonZeroExit(1)), "the worker's own failure must not be masked");
}

/// Records the `_instanceId` file content it finds in `payload_dir`,
/// for asserting §6's "written by runner" filesystem layout entry.
#[derive(Default)]
struct InstanceIdCapturingPostProcessor {
    seen: Mutex<Option<String>>,
}

#[async_trait::async_trait]
impl PostProcessor for InstanceIdCapturingPostProcessor {
    async fn process(&self, _instance_id: &jx_core::InstanceId, payload_dir: &std::path::Path) -> Result<(), RunnerError> {
        let contents = tokio::fs::read_to_string(payload_dir.join("_instanceId")).await.unwrap();
        *self.seen.lock() = Some(contents);
        Ok(())
    }
}

#[tokio::test]
async fn runner_writes_instance_id_into_the_adopted_payload() {
    let manifest_dir = tempdir().unwrap();
    let proc_root = tempdir().unwrap();
    let payload_dir = tempdir().unwrap();
    let post_processor = Arc::new(InstanceIdCapturingPostProcessor::default());

    let runner = make_runner(manifest_dir.path(), proc_root.path(), "true", vec![post_processor.clone()]);
    let (job, _log) = job_with_log(payload_dir.path());
    let instance_id = job.instance_id;

    let handle = runner.submit(job).await.unwrap();
    handle.wait_for_completion().await.unwrap();

    assert_eq!(post_processor.seen.lock().as_deref(), Some(instance_id.as_str()));
}

#[tokio::test]
async fn cancelling_a_running_job_kills_it_and_is_reflected_on_the_handle() {
    let manifest_dir = tempdir().unwrap();
    let proc_root = tempdir().unwrap();
    let payload_dir = tempdir().unwrap();
    let script = sleeper_script(manifest_dir.path(), 30);

    let runner = make_runner(manifest_dir.path(), proc_root.path(), script.to_str().unwrap(), vec![]);
    let (job, _log) = job_with_log(payload_dir.path());

    let handle = runner.submit(job).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.cancel();
    assert!(handle.is_cancelled());

    let result = handle.wait_for_completion().await;
    assert!(result.is_err(), "a killed worker should not report a clean exit");
}
