// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The orchestration state machine for one job (§4.6): resolve deps,
//! build the command, fork or one-shot launch, run to completion, then
//! always clean up.

use crate::command_builder::CommandBuilder;
use crate::config::RunnerConfig;
use crate::job_handle::JobHandle;
use crate::log_pump::LogPump;
use crate::process_pool::ProcessPool;
use crate::resolver::DependencyResolver;
use jx_adapters::{subprocess, Launcher, ProcessEntry};
use jx_core::{Fingerprint, PostProcessor, ProcessLog, RunnerError, RunnerJob};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;

/// How long cleanup waits for the worker's stdout/stderr pipes to drain
/// after it exits before giving up on shipping a partial tail (§9 open
/// question: "recommended: drain with bounded timeout").
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the collaborators needed to run jobs to completion: the
/// dependency resolver, the warm-process pool, the launcher, and the
/// post-processors run against every job once its worker has exited,
/// regardless of exit code.
pub struct JobRunner {
    resolver: Arc<DependencyResolver>,
    pool: Arc<ProcessPool>,
    launcher: Arc<Launcher>,
    runner_cfg: RunnerConfig,
    post_processors: Vec<Arc<dyn PostProcessor>>,
}

impl JobRunner {
    pub fn new(
        resolver: Arc<DependencyResolver>,
        pool: Arc<ProcessPool>,
        launcher: Arc<Launcher>,
        runner_cfg: RunnerConfig,
        post_processors: Vec<Arc<dyn PostProcessor>>,
    ) -> Self {
        Self { resolver, pool, launcher, runner_cfg, post_processors }
    }

    /// Run the synchronous setup (resolve → build → fork/one-shot) and,
    /// once the worker is running, spawn the background task that waits
    /// on it and cleans up. Returns as soon as the worker is launched;
    /// any setup failure is returned directly without producing a
    /// handle (§4.6 "resolveDeps fail ⇒ FAILED" before `CMD_BUILT`).
    pub async fn submit(&self, job: RunnerJob) -> Result<JobHandle, RunnerError> {
        let paths = self.resolver.resolve(&job).await?;
        let built = CommandBuilder::build(&job, &paths, &self.runner_cfg)?;
        let fingerprint = Fingerprint::of_argv(&built.argv);
        let can_prefork = job.can_use_prefork();

        let mut entry = if can_prefork {
            let launcher = self.launcher.clone();
            let argv = built.argv.clone();
            self.pool
                .take(fingerprint, move || async move { launch(&launcher, &argv, fingerprint).await })
                .await?
        } else {
            launch(&self.launcher, &built.argv, fingerprint).await?
        };

        if can_prefork {
            copy_dir_contents(&job.payload_dir, &entry.payload_dir()).await.map_err(RunnerError::from)?;
        } else {
            adopt_payload(&job.payload_dir, &entry.payload_dir()).await.map_err(RunnerError::from)?;
        }
        write_instance_id(&entry.payload_dir(), &job.instance_id).await.map_err(RunnerError::from)?;

        let cancel_notify = Arc::new(Notify::new());
        let cancelled = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicBool::new(false));
        let (tx, rx) = oneshot::channel();

        let log = job.log.clone();
        let post_processors = self.post_processors.clone();
        let instance_id = job.instance_id;
        let task_cancel = cancel_notify.clone();
        let task_done = done.clone();

        let stdout_reader = entry.child.stdout.take().map(|s| spawn_stream_reader(s, log.clone()));
        let stderr_reader = entry.child.stderr.take().map(|s| spawn_stream_reader(s, log.clone()));

        tokio::spawn(async move {
            let pump = LogPump::start(log.clone());
            let mut outcome = run_to_completion(&mut entry, task_cancel).await;

            for reader in [stdout_reader, stderr_reader].into_iter().flatten() {
                if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, reader).await.is_err() {
                    log.error("timed out draining worker output, partial log tail may be missing").await;
                }
            }

            if !pump.stop().await {
                log.error("log pump did not stop within its timeout, abandoning it").await;
            }

            let payload_dir = entry.payload_dir();
            for processor in &post_processors {
                if let Err(e) = processor.process(&instance_id, &payload_dir).await {
                    log.error(&format!("post-processing failed: {e}")).await;
                    let _ = subprocess::terminate(&mut entry.child).await;
                    if outcome.is_ok() {
                        outcome = Err(e);
                    }
                    break;
                }
            }

            if let Err(e) = entry.remove_dir().await {
                log.error(&format!("failed to remove working directory: {e}")).await;
            }
            log.delete().await;

            task_done.store(true, Ordering::SeqCst);
            let _ = tx.send(outcome);
        });

        Ok(JobHandle::new(cancel_notify, cancelled, done, rx))
    }
}

async fn launch(launcher: &Launcher, argv: &[String], fingerprint: Fingerprint) -> Result<ProcessEntry, RunnerError> {
    launcher.launch(argv, fingerprint).await.map_err(|e| RunnerError::LaunchFailure(e.to_string()))
}

/// Read `stream` to EOF, persisting every chunk through `log` (§4.4
/// "stderr merged into stdout": stdout and stderr are read by two of
/// these, both feeding the same `ProcessLog`, giving callers one
/// interleaved byte stream without an unsafe fd dup at spawn time).
fn spawn_stream_reader<R>(mut stream: R, log: Arc<dyn ProcessLog>) -> JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = [0u8; 8192];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => log.log(&buf[..n]).await,
            }
        }
    })
}

/// Wait for the worker to exit, racing a cancellation notification, and
/// map the result per §4.6's exit-code table. On cancellation the
/// process is terminated and its (now non-zero, or signal-terminated)
/// exit is reported the same way a naturally failing worker would be —
/// the handle's own `is_cancelled()` is how callers distinguish the two.
async fn run_to_completion(entry: &mut ProcessEntry, cancel: Arc<Notify>) -> Result<(), RunnerError> {
    tokio::select! {
        _ = cancel.notified() => {
            let _ = subprocess::terminate(&mut entry.child).await;
            map_exit(entry.child.wait().await)
        }
        result = entry.child.wait() => {
            map_exit(result)
        }
    }
}

fn map_exit(result: std::io::Result<std::process::ExitStatus>) -> Result<(), RunnerError> {
    match result {
        Ok(status) => match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(RunnerError::NonZeroExit(code)),
            None => Err(RunnerError::ExecutionInterrupted("worker terminated by signal".to_string())),
        },
        Err(e) => Err(RunnerError::ExecutionInterrupted(e.to_string())),
    }
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Recursively copy `src`'s contents into `dst`, which must already
/// exist (§4.3 "pre-fork adoption" — the warm entry's payload dir is
/// not moved since the process predates the job).
fn copy_dir_contents<'a>(src: &'a Path, dst: &'a Path) -> BoxFuture<'a, std::io::Result<()>> {
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let target = dst.join(entry.file_name());
            if file_type.is_dir() {
                tokio::fs::create_dir_all(&target).await?;
                copy_dir_contents(&entry.path(), &target).await?;
            } else {
                tokio::fs::copy(entry.path(), &target).await?;
            }
        }
        Ok(())
    })
}

/// Move `src` into `dst` (§4.3 "one-shot path"), falling back to a
/// recursive copy-then-remove when `src` and `dst` live on different
/// filesystems and `rename` can't cross the boundary.
async fn adopt_payload(src: &Path, dst: &Path) -> std::io::Result<()> {
    if tokio::fs::metadata(dst).await.is_ok() {
        tokio::fs::remove_dir_all(dst).await?;
    }
    match tokio::fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(_) => {
            tokio::fs::create_dir_all(dst).await?;
            copy_dir_contents(src, dst).await?;
            tokio::fs::remove_dir_all(src).await
        }
    }
}

/// Write `<payload>/_instanceId` once the payload has been adopted into
/// the process's working directory (§6 filesystem layout: "written by
/// runner").
async fn write_instance_id(payload_dir: &Path, instance_id: &jx_core::InstanceId) -> std::io::Result<()> {
    tokio::fs::write(payload_dir.join("_instanceId"), instance_id.as_str()).await
}

#[cfg(test)]
#[path = "job_runner_tests.rs"]
mod tests;
