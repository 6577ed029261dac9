// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store credential configuration and distribution to workers

use crate::error::ConfigError;
use fleet_adapters::{ExecError, ExecOutput};
use fleet_core::config::Settings;
use fleet_core::{CredentialSet, Secret, TokenRecord};
use fleet_storage::CredentialFile;
use std::fmt;

/// Delimiter of the heredoc carrying the config file
const HEREDOC_END: &str = "RCLONE_EOF";

/// The credential file bound to one remote
#[derive(Debug, Clone)]
pub struct Credentials {
    file: CredentialFile,
    remote: String,
    scope: String,
}

impl Credentials {
    pub fn new(file: CredentialFile, remote: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            file,
            remote: remote.into(),
            scope: scope.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            CredentialFile::new(&settings.paths.rclone_config),
            &settings.store.remote,
            &settings.auth.store_scope,
        )
    }

    pub fn file(&self) -> &CredentialFile {
        &self.file
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Write client identity for the remote, dropping any old token
    pub fn configure(&self, client_id: &str, client_secret: &Secret) -> Result<(), ConfigError> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(ConfigError::MissingClientId);
        }
        self.file
            .configure(&self.remote, client_id, client_secret, &self.scope)?;
        tracing::info!(remote = %self.remote, path = %self.file.path().display(), "credentials configured");
        Ok(())
    }

    pub fn load(&self) -> Result<CredentialSet, ConfigError> {
        if !self.file.exists() {
            return Err(ConfigError::MissingCredentialFile(self.file.path().to_path_buf()));
        }
        Ok(self.file.credentials(&self.remote)?)
    }

    pub fn store_token(&self, token: &TokenRecord) -> Result<(), ConfigError> {
        self.file.set_token(&self.remote, token)?;
        tracing::info!(remote = %self.remote, expiry = %token.expiry, "token stored");
        Ok(())
    }

    /// Raw file contents, for pushing to workers
    pub fn contents(&self) -> Result<String, ConfigError> {
        if !self.file.exists() {
            return Err(ConfigError::MissingCredentialFile(self.file.path().to_path_buf()));
        }
        Ok(self.file.read()?)
    }
}

/// Shell script that installs the store CLI if needed, writes `config`
/// to its default location, and checks the remote is listed.
///
/// The script embeds credentials and must never be logged.
pub fn sync_script(config: &str, remote: &str) -> String {
    format!(
        r#"if ! command -v rclone >/dev/null 2>&1; then
    apt-get update -qq
    apt-get install -y rclone >/dev/null 2>&1 || curl -s https://rclone.org/install.sh | bash >/dev/null 2>&1
fi
mkdir -p ~/.config/rclone
cat > ~/.config/rclone/rclone.conf << '{end}'
{config}
{end}
if rclone listremotes | grep -q "{remote}:"; then
    echo "SUCCESS"
else
    echo "ERROR:{remote} remote not found"
fi
"#,
        end = HEREDOC_END,
        config = config.trim_end(),
        remote = remote,
    )
}

/// How one worker's sync ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    Synced,
    Failed(String),
    /// The script ran but reported neither success nor an error
    Unclear,
}

impl SyncResult {
    pub fn from_exec(result: &Result<ExecOutput, ExecError>) -> Self {
        match result {
            Err(e) => Self::Failed(e.to_string()),
            Ok(output) => {
                let stdout = output.stdout.trim();
                if stdout.contains("SUCCESS") {
                    Self::Synced
                } else if let Some((_, error)) = stdout.rsplit_once("ERROR:") {
                    Self::Failed(error.trim().to_string())
                } else if !output.success() {
                    Self::Failed(format!(
                        "exit {}",
                        output.exit_code.map_or_else(|| "none".to_string(), |c| c.to_string())
                    ))
                } else {
                    Self::Unclear
                }
            }
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }
}

/// One rendered line per worker
pub struct SyncLine<'a> {
    pub worker: &'a str,
    pub result: &'a SyncResult,
}

impl fmt::Display for SyncLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.result {
            SyncResult::Synced => write!(f, "✅ {}: synced", self.worker),
            SyncResult::Failed(reason) => write!(f, "❌ {}: {}", self.worker, reason),
            SyncResult::Unclear => write!(f, "⚠️ {}: status unclear", self.worker),
        }
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
