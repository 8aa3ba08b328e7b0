// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds for the execution pipeline (§7).
//!
//! `CleanupWarning` never propagates as an `Err` — cleanup steps log it
//! and continue — but it is still a named variant so every cleanup path
//! reports through the same type instead of ad-hoc `tracing::warn!` calls
//! with no record of what ran.

use thiserror::Error;

/// Errors raised anywhere in the dependency-resolve → launch → run →
/// cleanup pipeline.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A dependency string was scheme-less or otherwise malformed.
    #[error("bad dependency url: {0}")]
    BadDependencyUrl(String),

    /// The policy gate produced at least one DENY verdict.
    #[error("forbidden dependencies: {0:?}")]
    ForbiddenDependencies(Vec<String>),

    /// The injected artifact resolver or its I/O failed.
    #[error("dependency resolution failed: {0}")]
    ResolverFailure(String),

    /// The OS process failed to spawn.
    #[error("launch failed: {0}")]
    LaunchFailure(String),

    /// The worker exited with a non-zero status.
    #[error("worker exited with code {0}")]
    NonZeroExit(i32),

    /// `proc.wait()` was interrupted rather than returning an exit code.
    #[error("execution interrupted: {0}")]
    ExecutionInterrupted(String),

    /// A post-processor failed after the worker exited.
    #[error("post-processing failed: {0}")]
    PostProcessingFailure(String),

    /// Non-fatal cleanup failure (working-dir deletion, log-pump timeout).
    /// Logged only; never surfaced to the job's caller over a more
    /// important error.
    #[error("cleanup warning: {0}")]
    CleanupWarning(String),

    /// Generic I/O failure not covered by a more specific variant above.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// True for variants that are logged-and-continue rather than fatal
    /// to the overall job outcome (§7 propagation policy).
    pub fn is_cleanup_only(&self) -> bool {
        matches!(self, Self::CleanupWarning(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
