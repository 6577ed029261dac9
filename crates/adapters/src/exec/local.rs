// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local process host

use super::{CommandHost, CommandSpec, ExecError, ExecOutput};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs programs on this machine
#[derive(Clone, Default)]
pub struct LocalHost {
    cwd: Option<PathBuf>,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command from `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(dir.into()),
        }
    }
}

#[async_trait]
impl CommandHost for LocalHost {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<ExecOutput, ExecError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        for (key, value) in &spec.env {
            command.env(key, value.expose());
        }

        // Dropping the output future on timeout kills the child
        match tokio::time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) => Ok(ExecOutput::from(output)),
            Ok(Err(e)) => Err(ExecError::Spawn {
                program: spec.program.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Err(ExecError::Timeout { after: timeout }),
        }
    }
}
