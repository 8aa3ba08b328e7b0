// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cooperatively-cancellable log-shipping background task (§4.5).

use jx_adapters::subprocess::LOG_PUMP_STOP_TIMEOUT;
use jx_core::{ProcessLog, StopFlag};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Drives a `ProcessLog::run` loop on a background task until `stop()`
/// is called, enforcing a hard timeout on how long it waits for the
/// loop to notice.
pub struct LogPump {
    should_stop: Arc<StopFlag>,
    task: JoinHandle<()>,
    stop_timeout: Duration,
}

impl LogPump {
    /// Start pumping `log` in the background (§4.5 "start").
    pub fn start(log: Arc<dyn ProcessLog>) -> Self {
        Self::start_with_timeout(log, LOG_PUMP_STOP_TIMEOUT)
    }

    /// As [`Self::start`], but with a caller-supplied stop timeout —
    /// exists so tests can exercise the timeout path without waiting a
    /// full minute.
    pub fn start_with_timeout(log: Arc<dyn ProcessLog>, stop_timeout: Duration) -> Self {
        let should_stop = Arc::new(StopFlag::new());
        let task_flag = should_stop.clone();
        let task = tokio::spawn(async move { log.run(task_flag).await });
        Self { should_stop, task, stop_timeout }
    }

    /// Signal the pump to stop and await it, up to the configured
    /// timeout. Returns `true` if the pump stopped in time, `false` if
    /// abandoned — callers log a warning on `false` and move on (§4.5,
    /// §5 "log-pump stop: 1-minute hard timeout").
    pub async fn stop(self) -> bool {
        self.should_stop.set();
        tokio::time::timeout(self.stop_timeout, self.task).await.is_ok()
    }
}

#[cfg(test)]
#[path = "log_pump_tests.rs"]
mod tests;
