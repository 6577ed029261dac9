// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Password-authenticated ssh/scp through `sshpass`

use super::RemoteAdapter;
use crate::exec::{CommandHost, CommandSpec, ExecError, ExecOutput, LocalHost};
use async_trait::async_trait;
use fleet_core::config::SshSettings;
use fleet_core::Secret;
use std::path::Path;
use std::time::Duration;

/// sshpass exit code for a rejected password
const SSHPASS_BAD_PASSWORD: i32 = 5;
/// sshpass exit code for an unknown host key prompt
const SSHPASS_HOST_KEY: i32 = 6;
/// ssh exit code for its own failures (as opposed to the remote command's)
const SSH_ERROR: i32 = 255;

const CONNECT_FAILURES: &[&str] = &[
    "Connection refused",
    "Connection timed out",
    "Connection reset",
    "Connection closed",
    "No route to host",
    "Network is unreachable",
    "Could not resolve hostname",
    "Permission denied",
    "Host key verification failed",
    "kex_exchange_identification",
];

/// stderr lines that pin sshpass codes 5 and 6 on the login rather than the remote command
const LOGIN_FAILURES: &[&str] = &[
    "Permission denied",
    "Host key verification failed",
    "REMOTE HOST IDENTIFICATION HAS CHANGED",
    "sshpass",
];

/// Connection options shared by ssh and scp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshOptions {
    pub user: String,
    pub connect_timeout: Duration,
    pub keepalive_interval: Duration,
    pub keepalive_count: u32,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self::from(&SshSettings::default())
    }
}

impl From<&SshSettings> for SshOptions {
    fn from(settings: &SshSettings) -> Self {
        Self {
            user: settings.user.clone(),
            connect_timeout: settings.connect_timeout,
            keepalive_interval: settings.keepalive_interval,
            keepalive_count: settings.keepalive_count,
        }
    }
}

impl SshOptions {
    /// `-o` options: no host key prompt, bounded connect phase, keep-alives
    fn base_args(&self) -> Vec<String> {
        let options = [
            "StrictHostKeyChecking=no".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
            "LogLevel=ERROR".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
            format!("ServerAliveInterval={}", self.keepalive_interval.as_secs().max(1)),
            format!("ServerAliveCountMax={}", self.keepalive_count),
        ];
        options
            .into_iter()
            .flat_map(|o| ["-o".to_string(), o])
            .collect()
    }
}

/// Remote adapter that shells out to `sshpass` with the password in `SSHPASS`
#[derive(Clone)]
pub struct SshAdapter<H = LocalHost> {
    host: H,
    options: SshOptions,
}

impl SshAdapter<LocalHost> {
    pub fn new(options: SshOptions) -> Self {
        Self::with_host(LocalHost::new(), options)
    }
}

impl<H: CommandHost> SshAdapter<H> {
    /// Use `host` to launch the ssh client processes
    pub fn with_host(host: H, options: SshOptions) -> Self {
        Self { host, options }
    }

    fn destination(&self, address: &str) -> String {
        format!("{}@{}", self.options.user, address)
    }

    fn ssh_command(&self, address: &str, credential: &Secret, command: &str) -> CommandSpec {
        CommandSpec::new("sshpass")
            .args(["-e", "ssh"])
            .args(self.options.base_args())
            .arg(self.destination(address))
            .arg(command)
            .env("SSHPASS", credential.clone())
    }

    fn scp_command(
        &self,
        address: &str,
        credential: &Secret,
        local: &Path,
        remote_path: &str,
    ) -> CommandSpec {
        CommandSpec::new("sshpass")
            .args(["-e", "scp"])
            .args(self.options.base_args())
            .arg(local.to_string_lossy())
            .arg(format!("{}:{}", self.destination(address), remote_path))
            .env("SSHPASS", credential.clone())
    }

    async fn launch(
        &self,
        address: &str,
        spec: CommandSpec,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError> {
        let output = self.host.run(&spec, timeout).await?;
        match connect_failure(&output) {
            Some(reason) => Err(ExecError::Connect {
                address: address.to_string(),
                reason,
            }),
            None => Ok(output),
        }
    }
}

/// Distinguish the transport failing from the remote command failing
///
/// sshpass passes the remote exit status through, so 5 and 6 only count as a
/// login failure when the remote side produced nothing of its own.
fn connect_failure(output: &ExecOutput) -> Option<String> {
    match output.exit_code {
        Some(SSHPASS_BAD_PASSWORD) if login_failed(output) => {
            Some("authentication failed".to_string())
        }
        Some(SSHPASS_HOST_KEY) if login_failed(output) => {
            Some("host key not accepted".to_string())
        }
        Some(SSH_ERROR) => {
            let stderr = output.stderr.trim();
            CONNECT_FAILURES
                .iter()
                .any(|pattern| stderr.contains(pattern))
                .then(|| stderr.lines().last().unwrap_or(stderr).to_string())
        }
        _ => None,
    }
}

fn login_failed(output: &ExecOutput) -> bool {
    let stderr = output.stderr.trim();
    output.stdout.trim().is_empty()
        && (stderr.is_empty() || LOGIN_FAILURES.iter().any(|pattern| stderr.contains(pattern)))
}

#[async_trait]
impl<H: CommandHost> RemoteAdapter for SshAdapter<H> {
    async fn execute(
        &self,
        address: &str,
        credential: &Secret,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError> {
        let spec = self.ssh_command(address, credential, command);
        self.launch(address, spec, timeout).await
    }

    async fn upload(
        &self,
        address: &str,
        credential: &Secret,
        local: &Path,
        remote_path: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError> {
        let spec = self.scp_command(address, credential, local, remote_path);
        self.launch(address, spec, timeout).await
    }
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
