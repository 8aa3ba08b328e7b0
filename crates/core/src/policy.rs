// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency policy gate types (§4.1 "Policy gate", §6 policy engine contract).

use crate::artifact::ResolvedArtifact;
use serde::Deserialize;

/// A single rule loaded from `.concord/policy.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyRule {
    /// Glob-ish pattern matched against an artifact's `uri`
    /// (e.g. `"g:b:*"` for a Maven groupId:artifactId:version prefix).
    pub pattern: String,
    pub action: PolicyAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyAction {
    Allow,
    Warn,
    Deny,
}

/// The rules document at `<payload>/.concord/policy.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// An artifact matched against a rule with a non-`Allow` verdict.
#[derive(Debug, Clone)]
pub struct PolicyVerdict {
    pub artifact: ResolvedArtifact,
    pub rule: PolicyRule,
}

/// Result of applying the policy gate to a resolved artifact set.
#[derive(Debug, Clone, Default)]
pub struct PolicyOutcome {
    pub allow: Vec<ResolvedArtifact>,
    pub warn: Vec<PolicyVerdict>,
    pub deny: Vec<PolicyVerdict>,
}

impl PolicyOutcome {
    pub fn is_forbidden(&self) -> bool {
        !self.deny.is_empty()
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
