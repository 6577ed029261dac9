// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with suggestions.
//!
//! Dispatch refusals and registry errors are shown with a hint on how to
//! get past them.

use fleet_core::RegistryError;
use fleet_engine::{ConfigError, EngineError, PreconditionError};
use std::fmt;

/// Error with recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for suggestion in &self.suggestions {
            write!(f, "\n  hint: {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for CliError {}

impl From<PreconditionError> for CliError {
    fn from(err: PreconditionError) -> Self {
        let error = CliError::new(err.to_string());
        match err {
            PreconditionError::NoActiveWorker => {
                error.with_suggestion("add one with `fleet worker add` or pick one with `fleet worker activate`")
            }
            PreconditionError::NoEnabledWorkers => {
                error.with_suggestion("enable a worker with `fleet worker enable <id>`")
            }
            PreconditionError::WorkerNotFound(_) => {
                error.with_suggestion("list known workers with `fleet worker list`")
            }
            PreconditionError::WorkerDisabled(id) => {
                error.with_suggestion(format!("enable it with `fleet worker enable {}`", id))
            }
            PreconditionError::MissingFile(_) | PreconditionError::Invalid(_) => error,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let error = CliError::new(err.to_string());
        match err {
            ConfigError::MissingClientId | ConfigError::MissingCredentialFile(_) => error
                .with_suggestion("configure the store client with `fleet creds configure <id> <secret>`"),
            ConfigError::Storage(_) => error,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Precondition(e) => e.into(),
            EngineError::Config(e) => e.into(),
            EngineError::Registry(RegistryError::Conflict { address, existing }) => {
                CliError::new(format!(
                    "address {} is already registered as {}",
                    address, existing
                ))
                .with_suggestion(format!(
                    "change the existing worker with `fleet worker update {} address <new>`",
                    existing
                ))
            }
            other => CliError::new(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
