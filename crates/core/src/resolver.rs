// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The artifact resolver collaborator contract (§6).

use crate::artifact::ResolvedArtifact;
use crate::error::RunnerError;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Resolves a deduplicated set of dependency URIs (Maven or direct URL)
/// into locally materialized artifacts. Fetching from remote
/// repositories is out of scope for this crate (§1 non-goals) — this
/// trait is the seam an embedder fills in.
#[async_trait]
pub trait ArtifactResolver: Send + Sync {
    async fn resolve(&self, uris: &BTreeSet<String>) -> Result<Vec<ResolvedArtifact>, RunnerError>;
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
