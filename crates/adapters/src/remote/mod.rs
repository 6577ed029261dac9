// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote execution channel
//!
//! Runs a command on a host reachable over a secure shell and captures
//! `{stdout, stderr, exit_code}`. No retries: one attempt, reported as-is.

mod ssh;

pub use ssh::{SshAdapter, SshOptions};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRemoteAdapter, RemoteCall};

use crate::exec::{CommandHost, CommandSpec, ExecError, ExecOutput};
use async_trait::async_trait;
use fleet_core::{Secret, Worker};
use std::path::Path;
use std::time::Duration;

/// Adapter for running commands on remote hosts
#[async_trait]
pub trait RemoteAdapter: Clone + Send + Sync + 'static {
    /// Run a shell command on `address`
    async fn execute(
        &self,
        address: &str,
        credential: &Secret,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError>;

    /// Copy a local file to `remote_path` on `address`
    async fn upload(
        &self,
        address: &str,
        credential: &Secret,
        local: &Path,
        remote_path: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError>;
}

/// A worker seen as a [`CommandHost`]: commands are shell-quoted and run
/// through the remote channel.
#[derive(Clone)]
pub struct WorkerHost<R> {
    remote: R,
    address: String,
    credential: Secret,
}

impl<R: RemoteAdapter> WorkerHost<R> {
    pub fn new(remote: R, worker: &Worker) -> Self {
        Self {
            remote,
            address: worker.address.clone(),
            credential: worker.credential.clone(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl<R: RemoteAdapter> CommandHost for WorkerHost<R> {
    async fn run(&self, command: &CommandSpec, timeout: Duration) -> Result<ExecOutput, ExecError> {
        self.remote
            .execute(&self.address, &self.credential, &command.to_shell(), timeout)
            .await
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
