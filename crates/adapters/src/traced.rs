// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability
//!
//! Credentials never reach the log: remote calls record the address and
//! the command length only.

use crate::auth::{AuthError, AuthServerAdapter};
use crate::exec::{ExecError, ExecOutput};
use crate::remote::RemoteAdapter;
use crate::store::{ObjectStoreAdapter, StoreError};
use async_trait::async_trait;
use fleet_core::{DeviceCode, PollResponse, Secret, StoreEntry};
use std::path::Path;
use std::time::Duration;
use tracing::Instrument;

/// Wrapper that adds tracing to any RemoteAdapter
#[derive(Clone)]
pub struct TracedRemoteAdapter<R> {
    inner: R,
}

impl<R> TracedRemoteAdapter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

fn log_exec(result: &Result<ExecOutput, ExecError>, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match result {
        Ok(output) if output.success() => tracing::info!(elapsed_ms, "completed"),
        Ok(output) => tracing::warn!(elapsed_ms, exit_code = ?output.exit_code, "non-zero exit"),
        Err(ExecError::Timeout { .. }) => tracing::warn!(elapsed_ms, "timed out"),
        Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
    }
}

#[async_trait]
impl<R: RemoteAdapter> RemoteAdapter for TracedRemoteAdapter<R> {
    async fn execute(
        &self,
        address: &str,
        credential: &Secret,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError> {
        let span = tracing::info_span!("remote.execute", address);
        async {
            tracing::info!(
                command_len = command.len(),
                timeout_secs = timeout.as_secs(),
                "starting"
            );
            let start = std::time::Instant::now();
            let result = self.inner.execute(address, credential, command, timeout).await;
            log_exec(&result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }

    async fn upload(
        &self,
        address: &str,
        credential: &Secret,
        local: &Path,
        remote_path: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError> {
        let span = tracing::info_span!(
            "remote.upload",
            address,
            local = %local.display(),
            remote_path
        );
        async {
            // Precondition: the local file must exist
            if !local.exists() {
                tracing::error!("local file does not exist");
                return Err(ExecError::Spawn {
                    program: "scp".to_string(),
                    reason: format!("local file does not exist: {}", local.display()),
                });
            }

            let start = std::time::Instant::now();
            let result = self
                .inner
                .upload(address, credential, local, remote_path, timeout)
                .await;
            log_exec(&result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any ObjectStoreAdapter
#[derive(Clone)]
pub struct TracedObjectStore<S> {
    inner: S,
    host: String,
}

impl<S> TracedObjectStore<S> {
    /// `host` names where the store commands run
    pub fn new(inner: S, host: impl Into<String>) -> Self {
        Self {
            inner,
            host: host.into(),
        }
    }
}

fn log_store<T>(result: &Result<T, StoreError>, start: std::time::Instant) {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::info!(elapsed_ms, "completed"),
        Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
    }
}

#[async_trait]
impl<S: ObjectStoreAdapter> ObjectStoreAdapter for TracedObjectStore<S> {
    async fn list_remotes(&self) -> Result<Vec<String>, StoreError> {
        let result = self.inner.list_remotes().await;
        tracing::debug!(
            host = %self.host,
            count = result.as_ref().map(|r| r.len()).ok(),
            "listed remotes"
        );
        result
    }

    async fn mkdir(&self, path: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.mkdir", host = %self.host, path);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.mkdir(path).await;
            log_store(&result, start);
            result
        }
        .instrument(span)
        .await
    }

    async fn list(&self, path: &str) -> Result<Vec<StoreEntry>, StoreError> {
        let span = tracing::info_span!("store.list", host = %self.host, path);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.list(path).await;
            match &result {
                Ok(entries) => tracing::info!(
                    count = entries.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "listed"
                ),
                Err(e) => tracing::error!(error = %e, "list failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn find(&self, dir: &str, name: &str) -> Result<Vec<String>, StoreError> {
        let result = self.inner.find(dir, name).await;
        tracing::debug!(
            host = %self.host,
            dir,
            name,
            found = result.as_ref().map(|r| r.len()).ok(),
            "lookup"
        );
        result
    }

    async fn delete_matching(&self, dir: &str, name: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.delete", host = %self.host, dir, name);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.delete_matching(dir, name).await;
            log_store(&result, start);
            result
        }
        .instrument(span)
        .await
    }

    async fn copy(&self, source: &str, destination: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.copy", host = %self.host, source, destination);
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.copy(source, destination).await;
            log_store(&result, start);
            result
        }
        .instrument(span)
        .await
    }

    async fn check(&self, remote: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.check", host = %self.host, remote);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.check(remote).await;
            log_store(&result, start);
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any AuthServerAdapter
#[derive(Clone)]
pub struct TracedAuthServer<A> {
    inner: A,
}

impl<A> TracedAuthServer<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: AuthServerAdapter> AuthServerAdapter for TracedAuthServer<A> {
    async fn request_code(&self, client_id: &str, scope: &str) -> Result<DeviceCode, AuthError> {
        let span = tracing::info_span!("auth.request_code", scope);
        async {
            let result = self.inner.request_code(client_id, scope).await;
            match &result {
                Ok(code) => tracing::info!(
                    interval_secs = code.interval.as_secs(),
                    expires_secs = code.expires_in.as_secs(),
                    "device code issued"
                ),
                Err(e) => tracing::error!(error = %e, "code request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn poll(
        &self,
        client_id: &str,
        client_secret: &Secret,
        device_code: &Secret,
    ) -> Result<PollResponse, AuthError> {
        let span = tracing::info_span!("auth.poll");
        async {
            let result = self.inner.poll(client_id, client_secret, device_code).await;
            match &result {
                Ok(PollResponse::Token(_)) => tracing::info!("token granted"),
                Ok(response) => tracing::debug!(?response, "polled"),
                Err(e) => tracing::warn!(error = %e, "poll failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
