// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The caller-facing handle to a running job (§4.7).

use jx_core::RunnerError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Notify};
use tokio::sync::Mutex as AsyncMutex;

/// A handle to one job's background execution task. Cheap to clone —
/// all state is shared via `Arc`.
#[derive(Clone)]
pub struct JobHandle {
    cancel_notify: Arc<Notify>,
    cancelled: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
    completion: Arc<AsyncMutex<Option<oneshot::Receiver<Result<(), RunnerError>>>>>,
}

impl JobHandle {
    pub(crate) fn new(
        cancel_notify: Arc<Notify>,
        cancelled: Arc<AtomicBool>,
        done: Arc<AtomicBool>,
        completion: oneshot::Receiver<Result<(), RunnerError>>,
    ) -> Self {
        Self { cancel_notify, cancelled, done, completion: Arc::new(AsyncMutex::new(Some(completion))) }
    }

    /// Block until the runner's background task finishes, re-raising
    /// whatever error it produced. Calling this more than once (or from
    /// more than one clone) returns `ExecutionInterrupted` on every call
    /// after the first, since the underlying channel is one-shot.
    pub async fn wait_for_completion(&self) -> Result<(), RunnerError> {
        let receiver = self.completion.lock().await.take();
        match receiver {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(RunnerError::ExecutionInterrupted("job task dropped without a result".into()))),
            None => Err(RunnerError::ExecutionInterrupted("completion already awaited".into())),
        }
    }

    /// Idempotent: a no-op if the job is already done or already
    /// cancelled; otherwise flags cancellation and wakes the runner task
    /// so it kills the worker process (§4.7).
    pub fn cancel(&self) {
        if self.done.load(Ordering::SeqCst) {
            return;
        }
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel_notify.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "job_handle_tests.rs"]
mod tests;
