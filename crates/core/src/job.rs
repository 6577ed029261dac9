// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jobs: one dispatched unit of remote work
//!
//! A job is ephemeral. It is built at dispatch, runs on its own task, and
//! resolves to exactly one [`JobOutcome`] which is delivered once and dropped.

use crate::registry::Worker;
use crate::secret::Secret;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Maximum number of characters of captured output shown in a notification
pub const PREVIEW_LIMIT: usize = 3500;

const TRUNCATED_MARKER: &str = "... (output truncated)";

/// How an install picks the operating system it lays down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InstallMode {
    /// Container-based install of a stock OS, optionally from a stored artifact
    Docker {
        os_code: String,
        #[serde(default)]
        artifact: Option<String>,
    },
    /// Fast path: restore a prebuilt golden image
    Image { image: String },
}

/// The machine an install is performed on (a customer host, not a worker)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallTarget {
    pub address: String,
    pub credential: Secret,
}

/// Where a published artifact comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum PublishSource {
    /// A file on the orchestrator host
    Local { path: PathBuf },
    /// A file on the job's target worker
    Worker { path: String },
}

impl PublishSource {
    /// File name the artifact is published under
    pub fn artifact_name(&self) -> String {
        let path = match self {
            Self::Local { path } => path.to_string_lossy().into_owned(),
            Self::Worker { path } => path.clone(),
        };
        path.rsplit('/').next().unwrap_or_default().to_string()
    }
}

/// Which workers a job fans out to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    /// Store-only job, no worker
    None,
    /// The registry's active worker
    Active,
    /// A specific worker by id
    Worker(String),
    /// Every enabled worker
    AllEnabled,
}

/// Kind of job together with its typed payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobKind {
    /// Reachability check with memory and disk summary
    Probe,
    /// Arbitrary shell command on a worker
    Command { command: String },
    MakeDir { path: String },
    /// Image files in the worker's local image folder
    ListWorkerImages,
    /// Run the build script on a worker
    BuildImage { os_code: String, output_name: String },
    /// Run the local install script against a customer host
    Install {
        target: InstallTarget,
        mode: InstallMode,
        auth_token: Secret,
    },
    Publish { source: PublishSource },
    Store { local_path: PathBuf, folder: String },
    Fetch {
        remote_path: String,
        local_destination: PathBuf,
    },
    Delete { name: String },
    ListArtifacts,
    /// Push the store credential file to workers
    SyncCredentials,
}

impl JobKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::Command { .. } => "command",
            Self::MakeDir { .. } => "mkdir",
            Self::ListWorkerImages => "list_worker_images",
            Self::BuildImage { .. } => "build_image",
            Self::Install { .. } => "install",
            Self::Publish { .. } => "publish",
            Self::Store { .. } => "store",
            Self::Fetch { .. } => "fetch",
            Self::Delete { .. } => "delete",
            Self::ListArtifacts => "list_artifacts",
            Self::SyncCredentials => "sync_credentials",
        }
    }

    /// Whether the job needs at least one resolved worker to run
    pub fn needs_worker(&self) -> bool {
        match self {
            Self::Install { .. }
            | Self::Store { .. }
            | Self::Fetch { .. }
            | Self::Delete { .. }
            | Self::ListArtifacts => false,
            Self::Publish { source } => matches!(source, PublishSource::Worker { .. }),
            _ => true,
        }
    }
}

/// A job ready to run: kind, resolved workers, deadline
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub kind: JobKind,
    /// Resolved targets; empty for store-only jobs
    pub workers: Vec<Worker>,
    /// Where the outcome notification goes
    pub destination: String,
    pub timeout: Duration,
    pub started_at: DateTime<Utc>,
}

impl Job {
    /// The single worker for worker-bound jobs
    pub fn target(&self) -> Option<&Worker> {
        self.workers.first()
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target().map(|w| w.id.as_str())
    }
}

/// Why a job did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobFailure {
    #[error("could not reach {address}: {reason}")]
    Connect { address: String, reason: String },
    #[error("timed out after {}", humantime::format_duration(*after))]
    Timeout { after: Duration },
    #[error("command failed with exit code {}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    NonZeroExit { code: Option<i32>, output: String },
    #[error("object store error: {0}")]
    Store(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("reported success but {0}")]
    VerificationMismatch(String),
    /// A fan-out job where some targets failed
    #[error("{failed} of {total} targets failed")]
    Partial {
        failed: usize,
        total: usize,
        output: String,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

/// Terminal status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Success,
    Failure,
    Timeout,
}

/// Successful job result
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobReport {
    /// One-line human summary
    pub message: String,
    /// Captured output, already truncated to a preview
    pub output: Option<String>,
}

impl JobReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            output: None,
        }
    }

    pub fn with_output(mut self, output: &str) -> Self {
        self.output = Some(preview(output, PREVIEW_LIMIT));
        self
    }
}

/// The single terminal result of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub job_id: String,
    pub kind: &'static str,
    pub worker: Option<String>,
    pub result: Result<JobReport, JobFailure>,
    pub elapsed: Duration,
}

impl JobOutcome {
    pub fn status(&self) -> JobStatus {
        match &self.result {
            Ok(_) => JobStatus::Success,
            Err(JobFailure::Timeout { .. }) => JobStatus::Timeout,
            Err(_) => JobStatus::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Render the outcome as a notification message body
    pub fn render(&self) -> String {
        let header = match self.status() {
            JobStatus::Success => "✅",
            JobStatus::Failure => "❌",
            JobStatus::Timeout => "⏱️",
        };
        let subject = match &self.worker {
            Some(worker) => format!("{} on {}", self.kind, worker),
            None => self.kind.to_string(),
        };
        match &self.result {
            Ok(report) => {
                let mut text = format!("{} {}: {}", header, subject, report.message);
                if let Some(output) = &report.output {
                    text.push_str("\n\n");
                    text.push_str(output);
                }
                text
            }
            Err(failure) => {
                let mut text = format!("{} {}: {}", header, subject, failure);
                if let JobFailure::NonZeroExit { output, .. } | JobFailure::Partial { output, .. } =
                    failure
                {
                    if !output.is_empty() {
                        text.push_str("\n\n");
                        text.push_str(output);
                    }
                }
                text
            }
        }
    }
}

/// Truncate captured output to at most `limit` characters plus a marker.
///
/// Counts characters, not bytes, so multi-byte output never splits.
pub fn preview(output: &str, limit: usize) -> String {
    match output.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}\n{}", &output[..cut], TRUNCATED_MARKER),
        None => output.to_string(),
    }
}

/// Last `limit` characters of output, for failures where the tail matters
pub fn tail(output: &str, limit: usize) -> String {
    let count = output.chars().count();
    if count <= limit {
        return output.to_string();
    }
    let kept: String = output.chars().skip(count - limit).collect();
    format!("{}\n{}", TRUNCATED_MARKER, kept)
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
