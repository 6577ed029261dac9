// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry
//!
//! An ordered list of remote builder machines plus the active pointer.
//! Invariant: `active` is empty or the id of an enabled worker in the list.

use crate::id::worker_id;
use crate::secret::Secret;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from registry mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("address {address} is already registered as {existing}")]
    Conflict { address: String, existing: String },
    #[error("worker not found: {0}")]
    NotFound(String),
    #[error("worker is disabled: {0}")]
    Disabled(String),
    #[error("invalid field '{0}': expected name, address or credential")]
    InvalidField(String),
}

/// One remote builder machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub name: String,
    #[serde(rename = "ip")]
    pub address: String,
    #[serde(rename = "password")]
    pub credential: Secret,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Mutable worker fields accepted by [`Registry::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerField {
    Name,
    Address,
    Credential,
}

impl FromStr for WorkerField {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "address" | "ip" => Ok(Self::Address),
            "credential" | "password" => Ok(Self::Credential),
            other => Err(RegistryError::InvalidField(other.to_string())),
        }
    }
}

impl fmt::Display for WorkerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Address => "address",
            Self::Credential => "credential",
        };
        f.write_str(name)
    }
}

/// Ordered worker collection with a single active pointer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(rename = "tumbal_list", default)]
    workers: Vec<Worker>,
    #[serde(rename = "active_tumbal", default)]
    active: String,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new worker.
    ///
    /// The worker becomes active when nothing else is.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        address: impl Into<String>,
        credential: impl Into<Secret>,
    ) -> Result<Worker, RegistryError> {
        let address = address.into();
        self.check_address_free(&address, None)?;

        let mut sequence = self.workers.len() + 1;
        let mut id = worker_id(sequence, &address);
        while self.get(&id).is_some() {
            sequence += 1;
            id = worker_id(sequence, &address);
        }

        let worker = Worker {
            id,
            name: name.into(),
            address,
            credential: credential.into(),
            enabled: true,
        };
        self.workers.push(worker.clone());

        if self.active.is_empty() {
            self.active = worker.id.clone();
        }
        Ok(worker)
    }

    /// Remove a worker, moving the active pointer if it pointed here
    pub fn remove(&mut self, id: &str) -> Result<Worker, RegistryError> {
        let idx = self
            .workers
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        let removed = self.workers.remove(idx);
        if self.active == id {
            self.reassign_active();
        }
        Ok(removed)
    }

    /// Change one field of a worker in place
    pub fn update(
        &mut self,
        id: &str,
        field: WorkerField,
        value: impl Into<String>,
    ) -> Result<Worker, RegistryError> {
        let value = value.into();
        if field == WorkerField::Address {
            self.check_address_free(&value, Some(id))?;
        }
        let worker = self
            .workers
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        match field {
            WorkerField::Name => worker.name = value,
            WorkerField::Address => worker.address = value,
            WorkerField::Credential => worker.credential = Secret::new(value),
        }
        Ok(worker.clone())
    }

    /// Enable or disable a worker. Disabling the active worker moves the pointer.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<Worker, RegistryError> {
        let worker = self
            .workers
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        worker.enabled = enabled;
        let worker = worker.clone();

        if !enabled && self.active == id {
            self.reassign_active();
        } else if enabled && self.active.is_empty() {
            self.active = worker.id.clone();
        }
        Ok(worker)
    }

    pub fn set_active(&mut self, id: &str) -> Result<(), RegistryError> {
        let worker = self
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        if !worker.enabled {
            return Err(RegistryError::Disabled(id.to_string()));
        }
        self.active = id.to_string();
        Ok(())
    }

    pub fn get_active(&self) -> Option<&Worker> {
        if self.active.is_empty() {
            return None;
        }
        self.workers
            .iter()
            .find(|w| w.id == self.active && w.enabled)
    }

    /// Id of the active worker, empty when none
    pub fn active_id(&self) -> &str {
        &self.active
    }

    pub fn get(&self, id: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    /// Snapshot of all workers in insertion order
    pub fn list(&self) -> Vec<Worker> {
        self.workers.clone()
    }

    /// Snapshot of enabled workers in insertion order
    pub fn enabled(&self) -> Vec<Worker> {
        self.workers.iter().filter(|w| w.enabled).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Repair an active pointer loaded from disk that no longer holds
    pub fn normalize(&mut self) {
        if !self.active.is_empty() && self.get_active().is_none() {
            self.reassign_active();
        }
    }

    fn reassign_active(&mut self) {
        self.active = self
            .workers
            .iter()
            .find(|w| w.enabled)
            .map(|w| w.id.clone())
            .unwrap_or_default();
    }

    fn check_address_free(&self, address: &str, except: Option<&str>) -> Result<(), RegistryError> {
        match self
            .workers
            .iter()
            .find(|w| w.address == address && Some(w.id.as_str()) != except)
        {
            Some(existing) => Err(RegistryError::Conflict {
                address: address.to_string(),
                existing: existing.id.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Build a registry from already-persisted parts
    pub fn from_parts(workers: Vec<Worker>, active: impl Into<String>) -> Self {
        let mut registry = Self {
            workers,
            active: active.into(),
        };
        registry.normalize();
        registry
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
