// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settings
//!
//! Loaded from an optional TOML file. Every field has a default, so an empty
//! file (or none at all) gives a working configuration. Durations are written
//! as humantime strings (`"2m"`, `"2h"`).

use crate::artifact::ArtifactFilter;
use crate::job::{InstallMode, JobKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "FLEET_CONFIG";
/// Environment variable overriding the state file
pub const STATE_ENV: &str = "FLEET_STATE";
/// Environment variable overriding the credential file
pub const RCLONE_CONFIG_ENV: &str = "RCLONE_CONFIG";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no home directory; set {0}")]
    NoHome(&'static str),
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub store: StoreSettings,
    pub ssh: SshSettings,
    pub timeouts: Timeouts,
    pub auth: AuthSettings,
}

/// Files the orchestrator reads and writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Bot state record (workers, active pointer, access lists)
    pub state_file: PathBuf,
    /// Credential file in rclone's ini format
    pub rclone_config: PathBuf,
    /// Directory holding the install and build scripts
    pub scripts_dir: PathBuf,
    pub install_script: String,
    pub build_script: String,
    /// Append-only record of install runs, inside `scripts_dir`
    pub install_log: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("bot_data.json"),
            rclone_config: PathBuf::from(".config/rclone/rclone.conf"),
            scripts_dir: PathBuf::from("."),
            install_script: "install_rdp.sh".to_string(),
            build_script: "build_golden_image.sh".to_string(),
            install_log: "rdp_install.log".to_string(),
        }
    }
}

impl PathSettings {
    pub fn install_script_path(&self) -> PathBuf {
        self.scripts_dir.join(&self.install_script)
    }

    pub fn build_script_path(&self) -> PathBuf {
        self.scripts_dir.join(&self.build_script)
    }

    pub fn install_log_path(&self) -> PathBuf {
        self.scripts_dir.join(&self.install_log)
    }
}

/// Object store location and artifact conventions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Remote name as configured in the credential file
    pub remote: String,
    /// Collection (folder) artifacts live in
    pub collection: String,
    pub suffixes: Vec<String>,
    pub golden_marker: String,
    /// Image folder on workers
    pub worker_images_dir: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        let filter = ArtifactFilter::default();
        Self {
            remote: "gdrive".to_string(),
            collection: "rdp-images".to_string(),
            suffixes: filter.suffixes,
            golden_marker: filter.golden_marker,
            worker_images_dir: "/root/rdp-images".to_string(),
        }
    }
}

impl StoreSettings {
    pub fn filter(&self) -> ArtifactFilter {
        ArtifactFilter {
            suffixes: self.suffixes.clone(),
            golden_marker: self.golden_marker.clone(),
        }
    }

    /// `gdrive:rdp-images`
    pub fn collection_path(&self) -> String {
        format!("{}:{}", self.remote, self.collection)
    }
}

/// Remote shell options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSettings {
    pub user: String,
    /// Bound on the connect phase, separate from the command timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Keep-alive probe interval for long-running commands
    #[serde(with = "humantime_serde")]
    pub keepalive_interval: Duration,
    pub keepalive_count: u32,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            user: "root".to_string(),
            connect_timeout: Duration::from_secs(10),
            keepalive_interval: Duration::from_secs(60),
            keepalive_count: 60,
        }
    }
}

/// Per-kind job timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub probe: Duration,
    #[serde(with = "humantime_serde")]
    pub command: Duration,
    #[serde(with = "humantime_serde")]
    pub install_docker: Duration,
    #[serde(with = "humantime_serde")]
    pub install_image: Duration,
    #[serde(with = "humantime_serde")]
    pub transfer: Duration,
    #[serde(with = "humantime_serde")]
    pub store_query: Duration,
    #[serde(with = "humantime_serde")]
    pub store_delete: Duration,
    #[serde(with = "humantime_serde")]
    pub sync_per_worker: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(30),
            command: Duration::from_secs(120),
            install_docker: Duration::from_secs(2400),
            install_image: Duration::from_secs(600),
            transfer: Duration::from_secs(7200),
            store_query: Duration::from_secs(45),
            store_delete: Duration::from_secs(120),
            sync_per_worker: Duration::from_secs(120),
        }
    }
}

impl Timeouts {
    /// Overall bound for a job of this kind fanned out to `workers` hosts
    pub fn for_job(&self, kind: &JobKind, workers: usize) -> Duration {
        match kind {
            JobKind::Probe | JobKind::MakeDir { .. } | JobKind::ListWorkerImages => self.probe,
            JobKind::Command { .. } => self.command,
            JobKind::Install { mode, .. } => match mode {
                InstallMode::Docker { .. } => self.install_docker,
                InstallMode::Image { .. } => self.install_image,
            },
            JobKind::BuildImage { .. }
            | JobKind::Publish { .. }
            | JobKind::Store { .. }
            | JobKind::Fetch { .. } => self.transfer,
            // mkdir + listing
            JobKind::ListArtifacts => self.store_query * 2,
            // check, delete, re-check
            JobKind::Delete { .. } => self.store_query * 2 + self.store_delete,
            JobKind::SyncCredentials => self.sync_per_worker * workers.max(1) as u32,
        }
    }
}

/// OAuth device authorization endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub device_code_url: String,
    pub token_url: String,
    /// Scope requested from the authorization server
    pub scope: String,
    /// Scope written into the credential file for the store tool
    pub store_scope: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Used when the server omits `expires_in` on the device code
    #[serde(with = "humantime_serde")]
    pub default_code_lifetime: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            device_code_url: "https://oauth2.googleapis.com/device/code".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scope: "https://www.googleapis.com/auth/drive.file".to_string(),
            store_scope: "drive.file".to_string(),
            request_timeout: Duration::from_secs(30),
            default_code_lifetime: Duration::from_secs(900),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, or defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Resolve the settings file and apply environment overrides.
    ///
    /// Relative paths are anchored: the state file and scripts at `base`,
    /// the credential file at `home`.
    pub fn resolve(
        explicit: Option<&Path>,
        base: &Path,
        home: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let config_path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| base.join("fleet.toml"));
        let mut settings = Self::load(&config_path)?;

        if let Some(state) = env(STATE_ENV) {
            settings.paths.state_file = PathBuf::from(state);
        }
        if let Some(conf) = env(RCLONE_CONFIG_ENV) {
            settings.paths.rclone_config = PathBuf::from(conf);
        }

        if settings.paths.state_file.is_relative() {
            settings.paths.state_file = base.join(&settings.paths.state_file);
        }
        if settings.paths.scripts_dir.is_relative() {
            settings.paths.scripts_dir = base.join(&settings.paths.scripts_dir);
        }
        if settings.paths.rclone_config.is_relative() {
            let home = home.ok_or(SettingsError::NoHome(RCLONE_CONFIG_ENV))?;
            settings.paths.rclone_config = home.join(&settings.paths.rclone_config);
        }
        Ok(settings)
    }

    /// Resolve against the process environment and home directory
    pub fn from_env(explicit: Option<&Path>, base: &Path) -> Result<Self, SettingsError> {
        let home = dirs::home_dir();
        Self::resolve(explicit, base, home.as_deref(), |key| std::env::var(key).ok())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
