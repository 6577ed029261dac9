// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object store adapters
//!
//! Paths are `remote:collection[/name]`, as the store CLI spells them.
//! A [`StoreProvider`] hands out a store bound to the orchestrator host or to
//! a worker, so the same operations can run wherever the file is.

mod rclone;

pub use rclone::{RcloneProvider, RcloneStore, StoreHost, StoreTimeouts};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeObjectStore, FakeStoreProvider, StoreCall};

use crate::exec::ExecError;
use async_trait::async_trait;
use fleet_core::{StoreEntry, Worker};
use thiserror::Error;

/// Errors from object store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("{operation} failed: {detail}")]
    Failed {
        operation: &'static str,
        detail: String,
    },
}

/// Adapter for object store operations
#[async_trait]
pub trait ObjectStoreAdapter: Clone + Send + Sync + 'static {
    /// Configured remote names, each with its trailing `:`
    async fn list_remotes(&self) -> Result<Vec<String>, StoreError>;

    /// Create a collection; succeeds if it exists
    async fn mkdir(&self, path: &str) -> Result<(), StoreError>;

    /// Every file below `path`, recursively
    async fn list(&self, path: &str) -> Result<Vec<StoreEntry>, StoreError>;

    /// Files directly in `dir` named exactly `name`
    async fn find(&self, dir: &str, name: &str) -> Result<Vec<String>, StoreError>;

    /// Delete files in `dir` named exactly `name`
    async fn delete_matching(&self, dir: &str, name: &str) -> Result<(), StoreError>;

    /// Copy a file or directory between local paths and store paths
    async fn copy(&self, source: &str, destination: &str) -> Result<(), StoreError>;

    /// Cheap authenticated call proving `remote` is usable
    async fn check(&self, remote: &str) -> Result<(), StoreError>;
}

/// Hands out stores bound to a host
pub trait StoreProvider: Clone + Send + Sync + 'static {
    type Store: ObjectStoreAdapter;

    /// Store commands run on the orchestrator host
    fn local(&self) -> Self::Store;

    /// Store commands run on `worker` over the remote channel
    fn on_worker(&self, worker: &Worker) -> Self::Store;
}

/// Escape glob metacharacters so a filter matches one literal name
pub fn literal_glob(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '{' | '}' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `gdrive:rdp-images` + `a.img` = `gdrive:rdp-images/a.img`
pub fn join(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_glob_escapes_metacharacters() {
        assert_eq!(literal_glob("win10.img.gz"), "win10.img.gz");
        assert_eq!(literal_glob("a[1]*.img"), r"a\[1\]\*.img");
        assert_eq!(literal_glob("{x}?"), r"\{x\}\?");
    }

    #[test]
    fn join_tolerates_trailing_slash() {
        assert_eq!(join("gdrive:rdp-images", "a.img"), "gdrive:rdp-images/a.img");
        assert_eq!(join("gdrive:rdp-images/", "a.img"), "gdrive:rdp-images/a.img");
    }
}
