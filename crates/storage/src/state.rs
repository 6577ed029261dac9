// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted bot state: access list, links and the worker registry

use crate::{write_atomic, StorageError};
use fleet_core::Registry;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Key of the single-worker record written by older releases
const LEGACY_WORKER_KEY: &str = "tumbal_vps";

/// The state record, as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotState {
    #[serde(default)]
    pub allowed_users: Vec<i64>,
    #[serde(default)]
    pub owner_link: String,
    #[serde(default)]
    pub channel_link: String,
    #[serde(flatten)]
    pub registry: Registry,
}

impl BotState {
    /// Fresh state for a deployment owned by `owner`
    pub fn for_owner(owner: Option<i64>) -> Self {
        Self {
            allowed_users: owner.into_iter().collect(),
            owner_link: "https://t.me/username_owner".to_string(),
            channel_link: "https://t.me/channel_name".to_string(),
            registry: Registry::new(),
        }
    }
}

/// Rewrite a legacy single-worker record into the list form.
///
/// Returns true when the document changed.
pub fn migrate_legacy(doc: &mut Map<String, Value>) -> bool {
    if doc.contains_key("tumbal_list") {
        return false;
    }
    let Some(legacy) = doc.remove(LEGACY_WORKER_KEY) else {
        return false;
    };

    let enabled = legacy.get("enabled").and_then(Value::as_bool).unwrap_or(false);
    let address = legacy.get("ip").and_then(Value::as_str).unwrap_or("");
    if enabled && !address.is_empty() {
        let password = legacy.get("password").and_then(Value::as_str).unwrap_or("");
        doc.insert(
            "tumbal_list".to_string(),
            json!([{
                "id": "tumbal1",
                "name": "Tumbal VPS 1",
                "ip": address,
                "password": password,
                "enabled": true,
            }]),
        );
        doc.insert("active_tumbal".to_string(), json!("tumbal1"));
    } else {
        doc.insert("tumbal_list".to_string(), json!([]));
        doc.insert("active_tumbal".to_string(), json!(""));
    }
    true
}

/// Loads and saves [`BotState`] at a fixed path
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state, or `default` when no file exists yet.
    ///
    /// Legacy records are migrated and written back before returning.
    pub fn load_or(&self, default: impl FnOnce() -> BotState) -> Result<BotState, StorageError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(default()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let parse_err = |source| StorageError::Parse {
            path: self.path.clone(),
            source,
        };
        let mut doc: Map<String, Value> = serde_json::from_str(&text).map_err(parse_err)?;
        let migrated = migrate_legacy(&mut doc);

        let mut state: BotState = serde_json::from_value(Value::Object(doc)).map_err(parse_err)?;
        state.registry.normalize();

        if migrated {
            self.save(&state)?;
        }
        Ok(state)
    }

    pub fn load(&self) -> Result<BotState, StorageError> {
        self.load_or(BotState::default)
    }

    /// Persist the full state, replacing the file atomically
    pub fn save(&self, state: &BotState) -> Result<(), StorageError> {
        let mut text = serde_json::to_string_pretty(state)?;
        text.push('\n');
        write_atomic(&self.path, text.as_bytes())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
