// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifacts held in the remote object store
//!
//! Nothing here is cached; listings are parsed from live store output.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A file in the object store collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Path relative to the collection root
    pub path: String,
    pub size: u64,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    pub is_golden: bool,
}

impl Artifact {
    /// Base file name
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn human_size(&self) -> String {
        human_size(self.size)
    }
}

/// Which files count as artifacts and how golden ones are spotted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFilter {
    pub suffixes: Vec<String>,
    pub golden_marker: String,
}

impl Default for ArtifactFilter {
    fn default() -> Self {
        Self {
            suffixes: vec![".img".to_string(), ".img.gz".to_string()],
            golden_marker: "golden".to_string(),
        }
    }
}

impl ArtifactFilter {
    /// Case-insensitive suffix match on the base name
    pub fn accepts(&self, name: &str) -> bool {
        let name = base_name(name).to_lowercase();
        self.suffixes
            .iter()
            .any(|suffix| name.ends_with(&suffix.to_lowercase()))
    }

    pub fn is_golden(&self, name: &str) -> bool {
        base_name(name)
            .to_lowercase()
            .contains(&self.golden_marker.to_lowercase())
    }

    /// Keep entries that pass the suffix filter, classifying each
    pub fn select(&self, entries: &[StoreEntry]) -> Vec<Artifact> {
        entries
            .iter()
            .filter(|entry| self.accepts(&entry.path))
            .map(|entry| Artifact {
                path: entry.path.clone(),
                size: entry.size,
                modified_at: entry.modified_at,
                is_golden: self.is_golden(&entry.path),
            })
            .collect()
    }

    /// Parse and select in one step
    pub fn parse_listing(&self, listing: &str) -> Vec<Artifact> {
        self.select(&parse_store_listing(listing))
    }
}

/// One file as reported by the store's recursive listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub path: String,
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

impl StoreEntry {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            modified_at: None,
        }
    }
}

/// `rclone lsf` prints modification times in the host's local zone
const LSF_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `time;size;path` or `size;path` lines.
///
/// Lines without a separator or path are skipped; an unparseable size reads
/// as zero and an unparseable time as unknown.
pub fn parse_store_listing(listing: &str) -> Vec<StoreEntry> {
    listing
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (first, rest) = line.split_once(';')?;
            let (modified_at, rest) = match parse_lsf_time(first) {
                Some(time) => (Some(time), rest),
                None => (None, line),
            };
            let (size, path) = rest.split_once(';')?;
            let path = path.trim();
            if path.is_empty() {
                return None;
            }
            Some(StoreEntry {
                path: path.to_string(),
                size: size.trim().parse().unwrap_or(0),
                modified_at,
            })
        })
        .collect()
}

fn parse_lsf_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(text, LSF_TIME_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|time| time.with_timezone(&Utc))
}

/// Golden artifacts first, each group in listing order
pub fn golden_first(artifacts: &[Artifact]) -> Vec<&Artifact> {
    let (golden, regular): (Vec<_>, Vec<_>) = artifacts.iter().partition(|a| a.is_golden);
    golden.into_iter().chain(regular).collect()
}

/// A file in a worker's local image folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub name: String,
    /// Size as printed by `ls -h`
    pub size: String,
}

/// Parse `ls -lhS` output into image rows; the `total` header is skipped
pub fn parse_ls_long(listing: &str) -> Vec<LocalImage> {
    listing
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 9 || parts[0] == "total" {
                return None;
            }
            Some(LocalImage {
                name: parts[parts.len() - 1].to_string(),
                size: parts[4].to_string(),
            })
        })
        .collect()
}

/// Format a byte count with one decimal in B/KB/MB/GB/TB
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
