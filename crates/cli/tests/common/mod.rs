// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated working directory with its own state and credential files
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_file(&self) -> PathBuf {
        self.path().join("state.json")
    }

    pub fn rclone_config(&self) -> PathBuf {
        self.path().join("rclone.conf")
    }

    /// `fleet` with every path pointed into the temp directory
    pub fn fleet(&self) -> Command {
        let mut cmd = Command::cargo_bin("fleet").expect("fleet binary");
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("FLEET_CONFIG", self.path().join("fleet.toml"))
            .env("FLEET_STATE", self.state_file())
            .env("RCLONE_CONFIG", self.rclone_config())
            .env_remove("FLEET_WORKER_PASSWORD")
            .env_remove("FLEET_CLIENT_SECRET")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Register a worker and return its id
    pub fn add_worker(&self, name: &str, address: &str) -> String {
        self.fleet()
            .args(["worker", "add", name, address, "--password", "pw"])
            .assert()
            .success();
        let digits: String = address
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let state = std::fs::read_to_string(self.state_file()).expect("state file");
        let doc: serde_json::Value = serde_json::from_str(&state).expect("state json");
        doc["tumbal_list"]
            .as_array()
            .and_then(|workers| {
                workers
                    .iter()
                    .filter_map(|w| w["id"].as_str())
                    .find(|id| id.ends_with(&digits))
            })
            .expect("worker id")
            .to_string()
    }
}
