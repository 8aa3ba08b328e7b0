// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn pool_config_deserializes_from_json() {
    let cfg: PoolConfig = serde_json::from_str(r#"{"max_age_secs": 60, "max_count": 4}"#).unwrap();
    assert_eq!(cfg.max_age(), Duration::from_secs(60));
    assert_eq!(cfg.max_count, 4);
}

#[test]
fn runner_config_deserializes_without_container() {
    let cfg: RunnerConfig = serde_json::from_str(
        r#"{
            "java_cmd": "java",
            "runner_path": "/opt/agent/runner.jar",
            "agent_id": "agent-1",
            "server_url": "https://control-plane.example",
            "manifest_dir": "/var/lib/agent/deps",
            "container": null
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.java_cmd, "java");
    assert!(cfg.container.is_none());
}
