// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency resolution pipeline (§4.1): union the job's declared deps
//! with the agent's defaults, normalize direct URLs, resolve artifacts,
//! gate them through policy, and emit a sorted path list.

use jx_adapters::HttpUrlNormalizer;
use jx_core::{
    union_dependency_strings, ArtifactResolver, DependencyUri, PolicyDocument, PolicyEngine, RunnerError, RunnerJob,
};
use std::sync::Arc;
use std::time::Instant;

/// Resolves a job's dependency set into a deterministic, policy-gated
/// list of local artifact paths.
pub struct DependencyResolver {
    defaults: Vec<String>,
    artifact_resolver: Arc<dyn ArtifactResolver>,
    policy_engine: Arc<dyn PolicyEngine>,
    http_normalizer: HttpUrlNormalizer,
}

impl DependencyResolver {
    pub fn new(
        defaults: Vec<String>,
        artifact_resolver: Arc<dyn ArtifactResolver>,
        policy_engine: Arc<dyn PolicyEngine>,
    ) -> Self {
        Self { defaults, artifact_resolver, policy_engine, http_normalizer: HttpUrlNormalizer::new() }
    }

    /// Run the full pipeline for `job`, returning dependency paths
    /// sorted lexicographically (§4.1 step 4 — the pool's fingerprint
    /// keying relies on this ordering being stable).
    pub async fn resolve(&self, job: &RunnerJob) -> Result<Vec<String>, RunnerError> {
        let started = Instant::now();
        let raw = union_dependency_strings(&self.defaults, &job.cfg.dependencies);

        if job.debug_mode {
            tracing::info!(uris = ?raw, "resolving dependencies");
        }

        let mut normalized = std::collections::BTreeSet::new();
        for raw_uri in &raw {
            let uri = DependencyUri::parse(raw_uri)?;
            let resolved = self.normalize(&uri).await?;
            normalized.insert(resolved);
        }

        let artifacts = self.artifact_resolver.resolve(&normalized).await?;

        let policy_doc = self.load_policy(job)?;
        let outcome = self.policy_engine.evaluate(&policy_doc, &artifacts);
        for verdict in &outcome.warn {
            tracing::warn!(uri = %verdict.artifact.uri, pattern = %verdict.rule.pattern, "dependency allowed with warning");
        }
        if outcome.is_forbidden() {
            let denied = outcome.deny.iter().map(|v| v.artifact.uri.clone()).collect();
            return Err(RunnerError::ForbiddenDependencies(denied));
        }

        let mut paths: Vec<String> = outcome
            .allow
            .iter()
            .chain(outcome.warn.iter().map(|v| &v.artifact))
            .map(|a| a.path.display().to_string())
            .collect();
        paths.sort();

        if job.debug_mode {
            tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, paths = ?paths, "dependencies resolved");
        }

        Ok(paths)
    }

    async fn normalize(&self, uri: &DependencyUri) -> Result<String, RunnerError> {
        if uri.is_maven() || uri.ends_in_jar() {
            return Ok(uri.as_str().to_string());
        }
        self.http_normalizer.normalize(uri.as_str()).await
    }

    fn load_policy(&self, job: &RunnerJob) -> Result<PolicyDocument, RunnerError> {
        let path = job.policy_path();
        if !path.is_file() {
            return Ok(PolicyDocument::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        serde_json::from_str(&contents).map_err(|e| RunnerError::ResolverFailure(format!("bad policy document {}: {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
