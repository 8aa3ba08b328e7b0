// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The content-addressed dependency manifest file (§3, §4.2 step 1, §6).

use crate::error::RunnerError;
use crate::fingerprint::hash_path_strings;
use std::path::{Path, PathBuf};

/// A newline-separated file of absolute artifact paths, named
/// `<sha256 of joined paths>.deps` under a manifest directory. Writing is
/// idempotent: a file with the target name is reused untouched rather
/// than overwritten, so two resolutions of the same dependency set never
/// race on file content.
pub struct DepsManifest;

impl DepsManifest {
    /// Compute the manifest path for `paths` under `manifest_dir`,
    /// without touching the filesystem.
    pub fn path_for(manifest_dir: &Path, paths: &[String]) -> PathBuf {
        manifest_dir.join(format!("{}.deps", hash_path_strings(paths)))
    }

    /// Write `paths` to their content-addressed manifest file under
    /// `manifest_dir`, creating the directory if needed, and return the
    /// path. If the file already exists it is left untouched (§8
    /// idempotence: "writers are idempotent").
    pub fn write(manifest_dir: &Path, paths: &[String]) -> Result<PathBuf, RunnerError> {
        std::fs::create_dir_all(manifest_dir)?;
        let target = Self::path_for(manifest_dir, paths);
        if target.exists() {
            return Ok(target);
        }
        let contents = paths.join("\n");
        std::fs::write(&target, contents)?;
        Ok(target)
    }

    /// Read back the paths recorded in a manifest file.
    pub fn read(manifest_path: &Path) -> Result<Vec<String>, RunnerError> {
        let contents = std::fs::read_to_string(manifest_path)?;
        Ok(contents.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }
}

#[cfg(test)]
#[path = "deps_manifest_tests.rs"]
mod tests;
