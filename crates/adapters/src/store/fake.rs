// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake object store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{join, ObjectStoreAdapter, StoreError, StoreProvider};
use async_trait::async_trait;
use fleet_core::{StoreEntry, Worker};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Recorded store call, tagged with the host it ran on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    /// `local` or a worker id
    pub host: String,
    pub operation: &'static str,
    pub args: Vec<String>,
}

#[derive(Default)]
struct StoreState {
    /// Full object path (`remote:dir/name`) to size
    objects: BTreeMap<String, u64>,
    /// Sizes of local files that `copy` may upload
    local_files: HashMap<String, u64>,
    /// Local paths that `copy` has written to
    fetched: Vec<String>,
    remotes: Vec<String>,
    failing: HashMap<&'static str, String>,
    sticky: HashSet<String>,
    calls: Vec<StoreCall>,
}

/// In-memory object store shared by every host handle
#[derive(Clone)]
pub struct FakeObjectStore {
    host: String,
    state: Arc<Mutex<StoreState>>,
}

impl Default for FakeObjectStore {
    fn default() -> Self {
        let state = StoreState {
            remotes: vec!["gdrive:".to_string()],
            ..StoreState::default()
        };
        Self {
            host: "local".to_string(),
            state: Arc::new(Mutex::new(state)),
        }
    }
}

impl FakeObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the same store, recording calls under `host`
    pub fn on_host(&self, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            state: Arc::clone(&self.state),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    pub fn put(&self, path: impl Into<String>, size: u64) {
        self.with_state(|s| s.objects.insert(path.into(), size));
    }

    pub fn contains(&self, path: &str) -> bool {
        self.with_state(|s| s.objects.contains_key(path))
    }

    /// Declare a local file so uploads know its size
    pub fn add_local_file(&self, path: impl Into<String>, size: u64) {
        self.with_state(|s| s.local_files.insert(path.into(), size));
    }

    pub fn set_remotes(&self, remotes: &[&str]) {
        self.with_state(|s| s.remotes = remotes.iter().map(|r| r.to_string()).collect());
    }

    /// Make one operation fail with `detail`
    pub fn fail(&self, operation: &'static str, detail: impl Into<String>) {
        self.with_state(|s| s.failing.insert(operation, detail.into()));
    }

    /// Deletes of `path` report success while the object stays
    pub fn make_sticky(&self, path: impl Into<String>) {
        self.with_state(|s| s.sticky.insert(path.into()));
    }

    pub fn fetched(&self) -> Vec<String> {
        self.with_state(|s| s.fetched.clone())
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.with_state(|s| s.calls.clone())
    }

    /// Operations in order, as `host operation`
    pub fn operations(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| format!("{} {}", c.host, c.operation))
            .collect()
    }

    fn begin(&self, operation: &'static str, args: &[&str]) -> Result<(), StoreError> {
        self.with_state(|s| {
            s.calls.push(StoreCall {
                host: self.host.clone(),
                operation,
                args: args.iter().map(|a| a.to_string()).collect(),
            });
            match s.failing.get(operation) {
                Some(detail) => Err(StoreError::Failed {
                    operation,
                    detail: detail.clone(),
                }),
                None => Ok(()),
            }
        })
    }
}

fn prefix(dir: &str) -> String {
    format!("{}/", dir.trim_end_matches('/'))
}

fn is_store_path(path: &str) -> bool {
    !path.starts_with('/') && path.contains(':')
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', ':']).next().unwrap_or(path)
}

#[async_trait]
impl ObjectStoreAdapter for FakeObjectStore {
    async fn list_remotes(&self) -> Result<Vec<String>, StoreError> {
        self.begin("listremotes", &[])?;
        Ok(self.with_state(|s| s.remotes.clone()))
    }

    async fn mkdir(&self, path: &str) -> Result<(), StoreError> {
        self.begin("mkdir", &[path])
    }

    async fn list(&self, path: &str) -> Result<Vec<StoreEntry>, StoreError> {
        self.begin("list", &[path])?;
        let prefix = prefix(path);
        Ok(self.with_state(|s| {
            s.objects
                .iter()
                .filter_map(|(p, size)| {
                    p.strip_prefix(&prefix)
                        .map(|rest| StoreEntry::new(rest, *size))
                })
                .collect()
        }))
    }

    async fn find(&self, dir: &str, name: &str) -> Result<Vec<String>, StoreError> {
        self.begin("find", &[dir, name])?;
        let path = join(dir, name);
        Ok(if self.contains(&path) {
            vec![name.to_string()]
        } else {
            Vec::new()
        })
    }

    async fn delete_matching(&self, dir: &str, name: &str) -> Result<(), StoreError> {
        self.begin("delete", &[dir, name])?;
        let path = join(dir, name);
        self.with_state(|s| {
            if !s.sticky.contains(&path) {
                s.objects.remove(&path);
            }
        });
        Ok(())
    }

    async fn copy(&self, source: &str, destination: &str) -> Result<(), StoreError> {
        self.begin("copy", &[source, destination])?;
        self.with_state(|s| {
            if is_store_path(destination) {
                let size = s.local_files.get(source).copied().unwrap_or(0);
                s.objects.insert(join(destination, base_name(source)), size);
                Ok(())
            } else if s.objects.contains_key(source) {
                s.fetched.push(join(destination, base_name(source)));
                Ok(())
            } else {
                Err(StoreError::Failed {
                    operation: "copy",
                    detail: format!("{} not found", source),
                })
            }
        })
    }

    async fn check(&self, remote: &str) -> Result<(), StoreError> {
        self.begin("check", &[remote])
    }
}

/// Provider whose handles all share one [`FakeObjectStore`]
#[derive(Clone, Default)]
pub struct FakeStoreProvider {
    store: FakeObjectStore,
}

impl FakeStoreProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared store, for seeding and assertions
    pub fn store(&self) -> &FakeObjectStore {
        &self.store
    }
}

impl StoreProvider for FakeStoreProvider {
    type Store = FakeObjectStore;

    fn local(&self) -> FakeObjectStore {
        self.store.on_host("local")
    }

    fn on_worker(&self, worker: &Worker) -> FakeObjectStore {
        self.store.on_host(worker.id.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
