// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process execution on a host
//!
//! A [`CommandHost`] runs one program with arguments under a timeout and
//! captures its output in full. Truncation for display is the caller's job.

mod local;

pub use local::LocalHost;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ExecCall, FakeCommandHost, FakeReply, Script};

use async_trait::async_trait;
use fleet_core::Secret;
use std::process::Output;
use std::time::Duration;
use thiserror::Error;

/// Errors from running a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("cannot connect to {address}: {reason}")]
    Connect { address: String, reason: String },
    #[error("timed out after {}s", after.as_secs())]
    Timeout { after: Duration },
    #[error("failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&self.stderr);
        }
        text
    }
}

impl From<Output> for ExecOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        }
    }
}

/// A program invocation: argv plus secret environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, Secret)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: Secret) -> Self {
        self.env.push((key.into(), value));
        self
    }

    /// Render as a single shell command line, quoting each word.
    ///
    /// Environment values are exposed, so the result must not be logged.
    pub fn to_shell(&self) -> String {
        let env = self
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k, shell_quote(v.expose())));
        let argv = std::iter::once(shell_quote(&self.program))
            .chain(self.args.iter().map(|a| shell_quote(a)));
        env.chain(argv).collect::<Vec<_>>().join(" ")
    }
}

/// Quote a word for POSIX `sh` when it contains anything beyond a safe set
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Runs commands on some host
#[async_trait]
pub trait CommandHost: Clone + Send + Sync + 'static {
    async fn run(&self, command: &CommandSpec, timeout: Duration) -> Result<ExecOutput, ExecError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
