// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A filesystem-backed `ProcessLog` (§3, §4.5, §6 of the spec): persists
//! a worker's drained bytes to a local append-only file and ships them
//! upstream through an injected [`LogTransport`] in a polling loop. The
//! wire format used to ship bytes is out of scope for this crate — that
//! seam is `LogTransport`.

use async_trait::async_trait;
use jx_core::{ProcessLog, StopFlag};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex as AsyncMutex;

/// Ships previously-persisted log bytes to wherever the control plane
/// expects them. Implementations decide the wire format (§1 non-goals).
#[async_trait]
pub trait LogTransport: Send + Sync {
    async fn ship(&self, instance_id: &str, bytes: &[u8]);
}

/// A `LogTransport` that discards everything, for embedders or tests
/// that have nowhere to ship logs.
pub struct NullTransport;

#[async_trait]
impl LogTransport for NullTransport {
    async fn ship(&self, _instance_id: &str, _bytes: &[u8]) {}
}

/// `ProcessLog` backed by a single append-only file under `log_path`.
/// `run` polls the file for growth past its last-shipped offset and
/// forwards new bytes to `transport` until told to stop.
pub struct FsProcessLog {
    instance_id: String,
    log_path: PathBuf,
    transport: Arc<dyn LogTransport>,
    poll_interval: Duration,
    writer: AsyncMutex<()>,
}

impl FsProcessLog {
    pub fn new(instance_id: impl Into<String>, log_path: impl Into<PathBuf>, transport: Arc<dyn LogTransport>) -> Self {
        Self {
            instance_id: instance_id.into(),
            log_path: log_path.into(),
            transport,
            poll_interval: Duration::from_millis(250),
            writer: AsyncMutex::new(()),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn log_path(&self) -> &std::path::Path {
        &self.log_path
    }

    async fn drain_since(&self, offset: u64) -> std::io::Result<(Vec<u8>, u64)> {
        let mut file = match tokio::fs::File::open(&self.log_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((Vec::new(), offset)),
            Err(e) => return Err(e),
        };
        file.seek(std::io::SeekFrom::Start(offset)).await?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;
        let new_offset = offset + buf.len() as u64;
        Ok((buf, new_offset))
    }
}

#[async_trait]
impl ProcessLog for FsProcessLog {
    async fn info(&self, message: &str) {
        tracing::info!(instance_id = %self.instance_id, "{}", message);
    }

    async fn error(&self, message: &str) {
        tracing::error!(instance_id = %self.instance_id, "{}", message);
    }

    async fn log(&self, bytes: &[u8]) {
        let _guard = self.writer.lock().await;
        if let Some(parent) = self.log_path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::error!(instance_id = %self.instance_id, error = %e, "failed to create log dir");
                return;
            }
        }
        let file = tokio::fs::OpenOptions::new().create(true).append(true).open(&self.log_path).await;
        match file {
            Ok(mut file) => {
                if let Err(e) = file.write_all(bytes).await {
                    tracing::error!(instance_id = %self.instance_id, error = %e, "failed to persist log bytes");
                }
            }
            Err(e) => {
                tracing::error!(instance_id = %self.instance_id, error = %e, "failed to open log file");
            }
        }
    }

    async fn run(&self, should_stop: Arc<StopFlag>) {
        let mut offset: u64 = 0;
        loop {
            let stopping = should_stop.is_set();
            match self.drain_since(offset).await {
                Ok((bytes, new_offset)) => {
                    if !bytes.is_empty() {
                        self.transport.ship(&self.instance_id, &bytes).await;
                        offset = new_offset;
                    }
                }
                Err(e) => {
                    tracing::warn!(instance_id = %self.instance_id, error = %e, "log pump read failed");
                }
            }
            if stopping {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn delete(&self) {
        let _guard = self.writer.lock().await;
        match tokio::fs::remove_file(&self.log_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(instance_id = %self.instance_id, error = %e, "failed to delete log file"),
        }
    }
}

#[cfg(test)]
#[path = "fs_process_log_tests.rs"]
mod tests;
