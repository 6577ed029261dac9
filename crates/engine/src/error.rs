// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use fleet_core::RegistryError;
use fleet_storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// A job was rejected before dispatch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("no active worker; add or activate one first")]
    NoActiveWorker,
    #[error("no enabled workers")]
    NoEnabledWorkers,
    #[error("worker not found: {0}")]
    WorkerNotFound(String),
    #[error("worker is disabled: {0}")]
    WorkerDisabled(String),
    #[error("required file is missing: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Missing or unusable store credentials
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("client id is empty")]
    MissingClientId,
    #[error("credential file not found: {}", .0.display())]
    MissingCredentialFile(PathBuf),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from synchronous engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
