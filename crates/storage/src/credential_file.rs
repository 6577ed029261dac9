// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The store tool's INI-style credential file
//!
//! Edits are line-based so sections and keys this crate does not know
//! about survive untouched.

use crate::{write_atomic, StorageError};
use fleet_core::{CredentialSet, Secret, TokenRecord};
use std::path::{Path, PathBuf};

fn section_name(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

fn key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// `key = value` pairs of one section, in file order
pub fn section_entries<'a>(text: &'a str, remote: &str) -> Option<Vec<(&'a str, &'a str)>> {
    let mut entries = None;
    for line in text.lines() {
        if let Some(name) = section_name(line) {
            if entries.is_some() {
                break;
            }
            if name.eq_ignore_ascii_case(remote) {
                entries = Some(Vec::new());
            }
            continue;
        }
        if let (Some(entries), Some(kv)) = (entries.as_mut(), key_value(line)) {
            entries.push(kv);
        }
    }
    entries
}

/// Set one key inside a section, appending the section if absent
pub fn set_key(text: &str, remote: &str, key: &str, value: &str) -> String {
    let assignment = format!("{} = {}", key, value);
    let mut out: Vec<String> = Vec::new();
    let mut in_section = false;
    let mut seen_section = false;
    let mut written = false;

    for line in text.lines() {
        if let Some(name) = section_name(line) {
            if in_section && !written {
                insert_before_blank_tail(&mut out, assignment.clone());
                written = true;
            }
            in_section = name.eq_ignore_ascii_case(remote);
            seen_section |= in_section;
            out.push(line.to_string());
            continue;
        }
        let is_key = key_value(line).is_some_and(|(k, _)| k.eq_ignore_ascii_case(key));
        if in_section && is_key {
            if !written {
                out.push(assignment.clone());
                written = true;
            }
        } else {
            out.push(line.to_string());
        }
    }

    if in_section && !written {
        insert_before_blank_tail(&mut out, assignment);
    } else if !seen_section {
        if out.last().is_some_and(|l| !l.trim().is_empty()) {
            out.push(String::new());
        }
        out.push(format!("[{}]", remote));
        out.push(assignment);
    }

    let mut rendered = out.join("\n");
    rendered.push('\n');
    rendered
}

fn insert_before_blank_tail(out: &mut Vec<String>, line: String) {
    let at = out
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(out.len(), |i| i + 1);
    out.insert(at, line);
}

/// Replace a whole section's body, keeping its position in the file
pub fn replace_section(text: &str, remote: &str, entries: &[(&str, &str)]) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut skipping = false;
    let mut written = false;
    let body: Vec<String> = entries
        .iter()
        .map(|(k, v)| format!("{} = {}", k, v))
        .collect();

    for line in text.lines() {
        if let Some(name) = section_name(line) {
            skipping = name.eq_ignore_ascii_case(remote);
            if skipping {
                if !written {
                    out.push(format!("[{}]", remote));
                    out.extend(body.iter().cloned());
                    out.push(String::new());
                    written = true;
                }
                continue;
            }
        }
        if !skipping {
            out.push(line.to_string());
        }
    }

    if !written {
        if out.last().is_some_and(|l| !l.trim().is_empty()) {
            out.push(String::new());
        }
        out.push(format!("[{}]", remote));
        out.extend(body);
    }
    while out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
    }

    let mut rendered = out.join("\n");
    rendered.push('\n');
    rendered
}

/// Credential file at a fixed path
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Raw file contents
    pub fn read(&self) -> Result<String, StorageError> {
        std::fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn read_or_empty(&self) -> Result<String, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Client identity and token for `remote`.
    ///
    /// An unparseable token reads as no token.
    pub fn credentials(&self, remote: &str) -> Result<CredentialSet, StorageError> {
        let text = self.read()?;
        let entries = section_entries(&text, remote).ok_or_else(|| StorageError::MissingSection {
            path: self.path.clone(),
            remote: remote.to_string(),
        })?;

        let lookup = |key: &str| {
            entries
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.to_string())
                .unwrap_or_default()
        };
        let token = Some(lookup("token"))
            .filter(|t| !t.is_empty())
            .and_then(|t| TokenRecord::from_json(&t).ok());

        Ok(CredentialSet {
            client_id: lookup("client_id"),
            client_secret: Secret::new(lookup("client_secret")),
            token,
        })
    }

    /// Write a fresh `[remote]` section for a drive backend.
    ///
    /// Any previous token for the remote is dropped; other sections stay.
    pub fn configure(
        &self,
        remote: &str,
        client_id: &str,
        client_secret: &Secret,
        scope: &str,
    ) -> Result<(), StorageError> {
        let text = self.read_or_empty()?;
        let updated = replace_section(
            &text,
            remote,
            &[
                ("type", "drive"),
                ("client_id", client_id),
                ("client_secret", client_secret.expose()),
                ("scope", scope),
            ],
        );
        write_atomic(&self.path, updated.as_bytes())
    }

    /// Rewrite the `token` key of `[remote]` in place
    pub fn set_token(&self, remote: &str, token: &TokenRecord) -> Result<(), StorageError> {
        let text = self.read_or_empty()?;
        let json = token.to_json()?;
        write_atomic(&self.path, set_key(&text, remote, "token", &json).as_bytes())
    }
}

#[cfg(test)]
#[path = "credential_file_tests.rs"]
mod tests;
