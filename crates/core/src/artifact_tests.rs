// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_has_empty_metadata() {
    let a = ResolvedArtifact::new("mvn:g:a:1", "/tmp/a.jar");
    assert_eq!(a.uri, "mvn:g:a:1");
    assert_eq!(a.path, PathBuf::from("/tmp/a.jar"));
    assert!(a.metadata.is_empty());
}
