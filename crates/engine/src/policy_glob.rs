// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The default [`PolicyEngine`] implementation: `*`-wildcard glob
//! matching of a rule's `pattern` against an artifact's `uri` (§6).

use jx_core::{PolicyAction, PolicyDocument, PolicyEngine, PolicyOutcome, PolicyVerdict, ResolvedArtifact};

/// Matches rule patterns containing `*` wildcards (e.g. `"mvn:com.acme:*"`)
/// against artifact URIs. The first rule in declaration order whose
/// pattern matches wins; an artifact matching no rule is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobPolicyEngine;

impl PolicyEngine for GlobPolicyEngine {
    fn evaluate(&self, document: &PolicyDocument, artifacts: &[ResolvedArtifact]) -> PolicyOutcome {
        let mut outcome = PolicyOutcome::default();
        for artifact in artifacts {
            match document.rules.iter().find(|rule| glob_match(&rule.pattern, &artifact.uri)) {
                Some(rule) if rule.action == PolicyAction::Deny => {
                    outcome.deny.push(PolicyVerdict { artifact: artifact.clone(), rule: rule.clone() });
                }
                Some(rule) if rule.action == PolicyAction::Warn => {
                    outcome.warn.push(PolicyVerdict { artifact: artifact.clone(), rule: rule.clone() });
                }
                _ => outcome.allow.push(artifact.clone()),
            }
        }
        outcome
    }
}

/// A minimal `*`-as-wildcard glob: `*` matches any run of characters
/// (including none), everything else matches literally. No character
/// classes, no `?`, no escaping — patterns here are simple prefix/suffix
/// shapes like `"g:a:*"` or `"*.snapshot.jar"`.
fn glob_match(pattern: &str, candidate: &str) -> bool {
    let mut segments = pattern.split('*').peekable();
    let anchored_start = !pattern.starts_with('*');
    let anchored_end = !pattern.ends_with('*');

    let mut rest = candidate;
    let mut first = true;
    while let Some(segment) = segments.next() {
        let is_last = segments.peek().is_none();
        if segment.is_empty() {
            first = false;
            continue;
        }
        if first && anchored_start {
            if !rest.starts_with(segment) {
                return false;
            }
            rest = &rest[segment.len()..];
        } else if is_last && anchored_end {
            if !rest.ends_with(segment) {
                return false;
            }
            rest = &rest[..rest.len() - segment.len()];
        } else {
            match rest.find(segment) {
                Some(idx) => rest = &rest[idx + segment.len()..],
                None => return false,
            }
        }
        first = false;
    }
    true
}

#[cfg(test)]
#[path = "policy_glob_tests.rs"]
mod tests;
