// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rclone-backed object store

use super::{literal_glob, ObjectStoreAdapter, StoreError, StoreProvider};
use crate::exec::{CommandHost, CommandSpec, ExecError, ExecOutput, LocalHost};
use crate::remote::{RemoteAdapter, WorkerHost};
use crate::traced::TracedObjectStore;
use async_trait::async_trait;
use fleet_core::artifact::parse_store_listing;
use fleet_core::config::Timeouts;
use fleet_core::{StoreEntry, Worker};
use std::path::PathBuf;
use std::time::Duration;

/// Step timeouts for store commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    /// Listings, lookups, mkdir, remote checks
    pub query: Duration,
    pub delete: Duration,
    /// Copies in either direction
    pub transfer: Duration,
}

impl From<&Timeouts> for StoreTimeouts {
    fn from(t: &Timeouts) -> Self {
        Self {
            query: t.store_query,
            delete: t.store_delete,
            transfer: t.transfer,
        }
    }
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self::from(&Timeouts::default())
    }
}

/// Object store driven through the `rclone` CLI on some host
#[derive(Clone)]
pub struct RcloneStore<H> {
    host: H,
    timeouts: StoreTimeouts,
    /// Explicit `--config` file; `None` uses rclone's default location
    config: Option<PathBuf>,
}

impl<H: CommandHost> RcloneStore<H> {
    pub fn new(host: H, timeouts: StoreTimeouts) -> Self {
        Self {
            host,
            timeouts,
            config: None,
        }
    }

    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = Some(config.into());
        self
    }

    fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = CommandSpec::new("rclone");
        let spec = match &self.config {
            Some(config) => spec.arg("--config").arg(config.to_string_lossy()),
            None => spec,
        };
        spec.args(args)
    }

    async fn run(
        &self,
        operation: &'static str,
        spec: CommandSpec,
        timeout: Duration,
    ) -> Result<ExecOutput, StoreError> {
        let output = self.host.run(&spec, timeout).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(StoreError::Failed {
                operation,
                detail: failure_detail(&output),
            })
        }
    }
}

fn failure_detail(output: &ExecOutput) -> String {
    let stderr = output.stderr.trim();
    let text = if stderr.is_empty() {
        output.stdout.trim()
    } else {
        stderr
    };
    match output.exit_code {
        Some(code) => format!("exit {}: {}", code, text),
        None => format!("killed: {}", text),
    }
}

fn lines(output: &ExecOutput) -> Vec<String> {
    output
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn dir_arg(dir: &str) -> String {
    format!("{}/", dir.trim_end_matches('/'))
}

/// Filter matching `name` directly under the listed directory only
fn top_level(name: &str) -> String {
    format!("/{}", literal_glob(name))
}

#[async_trait]
impl<H: CommandHost> ObjectStoreAdapter for RcloneStore<H> {
    async fn list_remotes(&self) -> Result<Vec<String>, StoreError> {
        let spec = self.command(["listremotes"]);
        let output = self.run("listremotes", spec, self.timeouts.query).await?;
        Ok(lines(&output))
    }

    async fn mkdir(&self, path: &str) -> Result<(), StoreError> {
        let spec = self.command(["mkdir", path]);
        self.run("mkdir", spec, self.timeouts.query).await?;
        Ok(())
    }

    async fn list(&self, path: &str) -> Result<Vec<StoreEntry>, StoreError> {
        let spec = self.command([
            "lsf".to_string(),
            dir_arg(path),
            "--recursive".to_string(),
            "--files-only".to_string(),
            "--format".to_string(),
            "tsp".to_string(),
        ]);
        let output = self.run("list", spec, self.timeouts.query).await?;
        Ok(parse_store_listing(&output.stdout))
    }

    async fn find(&self, dir: &str, name: &str) -> Result<Vec<String>, StoreError> {
        let spec = self.command([
            "lsf".to_string(),
            dir_arg(dir),
            "--files-only".to_string(),
            "--include".to_string(),
            top_level(name),
        ]);
        let output = self.run("find", spec, self.timeouts.query).await?;
        Ok(lines(&output).into_iter().filter(|l| l == name).collect())
    }

    async fn delete_matching(&self, dir: &str, name: &str) -> Result<(), StoreError> {
        let spec = self.command([
            "delete".to_string(),
            dir_arg(dir),
            "--include".to_string(),
            top_level(name),
            "-v".to_string(),
        ]);
        self.run("delete", spec, self.timeouts.delete).await?;
        Ok(())
    }

    async fn copy(&self, source: &str, destination: &str) -> Result<(), StoreError> {
        let spec = self.command(["copy", source, destination]);
        self.run("copy", spec, self.timeouts.transfer).await?;
        Ok(())
    }

    async fn check(&self, remote: &str) -> Result<(), StoreError> {
        let spec = self.command(["lsd".to_string(), format!("{}:", remote)]);
        self.run("check", spec, self.timeouts.query).await?;
        Ok(())
    }
}

/// Where rclone runs: here, or on a worker
#[derive(Clone)]
pub enum StoreHost<R> {
    Local(LocalHost),
    Worker(WorkerHost<R>),
}

#[async_trait]
impl<R: RemoteAdapter> CommandHost for StoreHost<R> {
    async fn run(&self, command: &CommandSpec, timeout: Duration) -> Result<ExecOutput, ExecError> {
        match self {
            Self::Local(host) => host.run(command, timeout).await,
            Self::Worker(host) => host.run(command, timeout).await,
        }
    }
}

/// Hands out traced rclone stores, locally or on workers
#[derive(Clone)]
pub struct RcloneProvider<R> {
    remote: R,
    timeouts: StoreTimeouts,
    local_config: Option<PathBuf>,
}

impl<R: RemoteAdapter> RcloneProvider<R> {
    pub fn new(remote: R, timeouts: StoreTimeouts) -> Self {
        Self {
            remote,
            timeouts,
            local_config: None,
        }
    }

    /// Credential file used by local rclone runs
    pub fn with_local_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.local_config = Some(config.into());
        self
    }
}

impl<R: RemoteAdapter> StoreProvider for RcloneProvider<R> {
    type Store = TracedObjectStore<RcloneStore<StoreHost<R>>>;

    fn local(&self) -> Self::Store {
        let store = RcloneStore::new(StoreHost::Local(LocalHost::new()), self.timeouts);
        let store = match &self.local_config {
            Some(config) => store.with_config(config),
            None => store,
        };
        TracedObjectStore::new(store, "local")
    }

    fn on_worker(&self, worker: &Worker) -> Self::Store {
        let host = StoreHost::Worker(WorkerHost::new(self.remote.clone(), worker));
        TracedObjectStore::new(RcloneStore::new(host, self.timeouts), worker.id.clone())
    }
}

#[cfg(test)]
#[path = "rclone_tests.rs"]
mod tests;
