// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The live worker registry and the state file behind it
//!
//! Mutations run against a copy, the copy is persisted, and only then does
//! it replace the shared state. Readers see the state before or after a
//! mutation, never between.

use crate::error::{EngineError, PreconditionError};
use fleet_core::{Registry, RegistryError, Secret, TargetSpec, Worker, WorkerField};
use fleet_storage::{BotState, StateStore, StorageError};
use std::sync::{Arc, Mutex};

/// Owned registry state shared by the front-end and jobs
#[derive(Clone)]
pub struct Fleet {
    state: Arc<Mutex<BotState>>,
    store: StateStore,
}

impl Fleet {
    /// Load state from `store`, starting from `default` when no file exists
    pub fn open(store: StateStore, default: impl FnOnce() -> BotState) -> Result<Self, StorageError> {
        let state = store.load_or(default)?;
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            store,
        })
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Registry) -> Result<T, RegistryError>,
    ) -> Result<T, EngineError> {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = guard.clone();
        let value = f(&mut next.registry)?;
        self.store.save(&next)?;
        *guard = next;
        Ok(value)
    }

    fn read<T>(&self, f: impl FnOnce(&BotState) -> T) -> T {
        f(&self.state.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn add_worker(
        &self,
        name: &str,
        address: &str,
        credential: Secret,
    ) -> Result<Worker, EngineError> {
        let worker = self.mutate(|r| r.add(name, address, credential))?;
        tracing::info!(worker = %worker.id, address, "worker added");
        Ok(worker)
    }

    pub fn remove_worker(&self, id: &str) -> Result<Worker, EngineError> {
        let worker = self.mutate(|r| r.remove(id))?;
        tracing::info!(worker = %worker.id, "worker removed");
        Ok(worker)
    }

    pub fn update_worker(
        &self,
        id: &str,
        field: WorkerField,
        value: &str,
    ) -> Result<Worker, EngineError> {
        let worker = self.mutate(|r| r.update(id, field, value))?;
        tracing::info!(worker = %worker.id, %field, "worker updated");
        Ok(worker)
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<Worker, EngineError> {
        self.mutate(|r| r.set_enabled(id, enabled))
    }

    pub fn set_active(&self, id: &str) -> Result<(), EngineError> {
        self.mutate(|r| r.set_active(id))?;
        tracing::info!(worker = id, "active worker changed");
        Ok(())
    }

    pub fn active(&self) -> Option<Worker> {
        self.read(|s| s.registry.get_active().cloned())
    }

    pub fn get(&self, id: &str) -> Option<Worker> {
        self.read(|s| s.registry.get(id).cloned())
    }

    /// Ordered snapshot of every worker
    pub fn workers(&self) -> Vec<Worker> {
        self.read(|s| s.registry.list())
    }

    pub fn snapshot(&self) -> BotState {
        self.read(BotState::clone)
    }

    /// Workers a job fans out to
    pub fn resolve(&self, target: &TargetSpec) -> Result<Vec<Worker>, PreconditionError> {
        self.read(|s| match target {
            TargetSpec::None => Ok(Vec::new()),
            TargetSpec::Active => s
                .registry
                .get_active()
                .cloned()
                .map(|w| vec![w])
                .ok_or(PreconditionError::NoActiveWorker),
            TargetSpec::Worker(id) => match s.registry.get(id) {
                None => Err(PreconditionError::WorkerNotFound(id.clone())),
                Some(w) if !w.enabled => Err(PreconditionError::WorkerDisabled(id.clone())),
                Some(w) => Ok(vec![w.clone()]),
            },
            TargetSpec::AllEnabled => {
                let workers = s.registry.enabled();
                if workers.is_empty() {
                    Err(PreconditionError::NoEnabledWorkers)
                } else {
                    Ok(workers)
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "fleet_tests.rs"]
mod tests;
