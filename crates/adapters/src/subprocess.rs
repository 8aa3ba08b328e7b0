// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers shared by the launcher and job runner.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::time::Duration;
use tokio::process::Child;

/// Hard timeout enforced on `LogPump::stop` (§4.5).
pub const LOG_PUMP_STOP_TIMEOUT: Duration = Duration::from_secs(60);

/// Grace period between SIGTERM and a forced kill when cancelling a
/// worker (§9 "cancellation without cooperation").
pub const CANCEL_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Send SIGTERM, give the worker `CANCEL_GRACE_PERIOD` to exit on its
/// own, then SIGKILL if it is still alive. The worker is an opaque OS
/// process (§9), so this is the only cancellation mechanism available.
pub async fn terminate(child: &mut Child) -> std::io::Result<()> {
    if let Some(pid) = child.id() {
        let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    }

    match tokio::time::timeout(CANCEL_GRACE_PERIOD, child.wait()).await {
        Ok(_) => Ok(()),
        Err(_elapsed) => child.kill().await,
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
