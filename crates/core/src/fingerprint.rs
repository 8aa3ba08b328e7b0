// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argv fingerprinting for warm-process pool keys.

use sha2::{Digest, Sha256};

/// SHA-256 digest of a launch command's argv.
///
/// Two [`ProcessEntry`](crate::process_entry::ProcessEntry) values may be
/// swapped for one another by the pool iff their fingerprints match, so
/// this must be computed over the exact, fully-normalized argv — never
/// over a display-formatted or partially-built command line.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hash an argv vector. Each element is separated by a NUL byte so that
    /// `["ab", "c"]` and `["a", "bc"]` never collide.
    pub fn of_argv<S: AsRef<str>>(argv: &[S]) -> Self {
        let mut hasher = Sha256::new();
        for (i, arg) in argv.iter().enumerate() {
            if i > 0 {
                hasher.update([0u8]);
            }
            hasher.update(arg.as_ref().as_bytes());
        }
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash an arbitrary sequence of path strings, used for deps-manifest
/// content addressing (see [`crate::deps_manifest`]).
pub fn hash_path_strings<S: AsRef<str>>(paths: &[S]) -> String {
    let mut hasher = Sha256::new();
    for (i, p) in paths.iter().enumerate() {
        if i > 0 {
            hasher.update([0u8]);
        }
        hasher.update(p.as_ref().as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
