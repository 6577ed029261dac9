// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! fleet-storage: on-disk state for the fleet orchestrator
//!
//! Every write goes to a sibling temp file, is synced, then renamed over
//! the target, so a crash leaves either the old or the new contents.

mod atomic;
pub mod credential_file;
pub mod state;

pub use atomic::write_atomic;
pub use credential_file::CredentialFile;
pub use state::{BotState, StateStore};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing persisted state
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid state file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{} has no [{remote}] section", path.display())]
    MissingSection { path: PathBuf, remote: String },
}
