// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake remote adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::RemoteAdapter;
use crate::exec::{ExecError, ExecOutput, FakeReply, Script};
use async_trait::async_trait;
use fleet_core::Secret;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Execute {
        address: String,
        command: String,
        timeout: Duration,
    },
    Upload {
        address: String,
        local: PathBuf,
        remote_path: String,
    },
}

impl RemoteCall {
    pub fn address(&self) -> &str {
        match self {
            Self::Execute { address, .. } | Self::Upload { address, .. } => address,
        }
    }

    /// The command, for execute calls
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Execute { command, .. } => Some(command),
            Self::Upload { .. } => None,
        }
    }
}

/// Fake remote adapter for testing
///
/// Replies are scripted by substring of `"<address> <command>"`, so a rule
/// can target one host, one command, or both.
#[derive(Clone, Default)]
pub struct FakeRemoteAdapter {
    script: Script,
    unreachable: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<RemoteCall>>>,
}

impl FakeRemoteAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, pattern: impl Into<String>, reply: FakeReply) -> &Self {
        self.script.on(pattern, reply);
        self
    }

    pub fn once(&self, pattern: impl Into<String>, reply: FakeReply) -> &Self {
        self.script.once(pattern, reply);
        self
    }

    /// Every call to `address` fails to connect
    pub fn set_unreachable(&self, address: impl Into<String>) {
        self.unreachable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(address.into());
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Commands executed, in order
    pub fn commands(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|c| c.command().map(str::to_string))
            .collect()
    }

    fn record(&self, call: RemoteCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn is_unreachable(&self, address: &str) -> bool {
        self.unreachable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(address)
    }

    async fn answer(&self, address: &str, line: &str, timeout: Duration) -> Result<ExecOutput, ExecError> {
        if self.is_unreachable(address) {
            return Err(ExecError::Connect {
                address: address.to_string(),
                reason: "Connection refused".to_string(),
            });
        }
        self.script
            .reply_for(&format!("{} {}", address, line))
            .deliver(timeout)
            .await
    }
}

#[async_trait]
impl RemoteAdapter for FakeRemoteAdapter {
    async fn execute(
        &self,
        address: &str,
        _credential: &Secret,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError> {
        self.record(RemoteCall::Execute {
            address: address.to_string(),
            command: command.to_string(),
            timeout,
        });
        self.answer(address, command, timeout).await
    }

    async fn upload(
        &self,
        address: &str,
        _credential: &Secret,
        local: &Path,
        remote_path: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError> {
        self.record(RemoteCall::Upload {
            address: address.to_string(),
            local: local.to_path_buf(),
            remote_path: remote_path.to_string(),
        });
        let line = format!("upload {} {}", local.display(), remote_path);
        self.answer(address, &line, timeout).await
    }
}
