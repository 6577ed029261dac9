// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job bodies: what each job kind does once it is running

use crate::artifacts::ArtifactClient;
use crate::credentials::{sync_script, Credentials, SyncLine, SyncResult};
use fleet_adapters::exec::shell_quote;
use fleet_adapters::{CommandHost, CommandSpec, ExecError, ExecOutput, RemoteAdapter, StoreProvider};
use fleet_core::artifact::{golden_first, parse_ls_long};
use fleet_core::config::Settings;
use fleet_core::job::{preview, tail, PREVIEW_LIMIT};
use fleet_core::{InstallMode, InstallTarget, Job, JobFailure, JobKind, JobReport, Secret, Worker};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

const PROBE_COMMAND: &str = "echo OK && free -h && df -h /";
const BUILD_MARKER: &str = "BUILD COMPLETE";
/// Where the build script is placed on a worker
const REMOTE_BUILD_SCRIPT: &str = "/root/build_golden_image.sh";

/// Output name used when a build request leaves it blank
pub fn default_output_name(os_code: &str) -> String {
    format!("golden-{}", os_code)
}

/// Everything a job body needs besides the job itself
#[derive(Clone)]
pub struct JobContext<R, P, H> {
    remote: R,
    artifacts: ArtifactClient<P>,
    local: H,
    credentials: Credentials,
    settings: Settings,
}

impl<R, P, H> JobContext<R, P, H>
where
    R: RemoteAdapter,
    P: StoreProvider,
    H: CommandHost,
{
    pub fn new(remote: R, stores: P, local: H, settings: Settings) -> Self {
        Self {
            remote,
            artifacts: ArtifactClient::new(stores, settings.store.clone()),
            local,
            credentials: Credentials::from_settings(&settings),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the job body to a single result
    pub async fn run(&self, job: &Job) -> Result<JobReport, JobFailure> {
        match &job.kind {
            JobKind::Probe => self.probe(target(job)?, job.timeout).await,
            JobKind::Command { command } => self.command(target(job)?, command, job.timeout).await,
            JobKind::MakeDir { path } => self.make_dir(target(job)?, path, job.timeout).await,
            JobKind::ListWorkerImages => self.list_worker_images(target(job)?, job.timeout).await,
            JobKind::BuildImage {
                os_code,
                output_name,
            } => {
                self.build_image(target(job)?, os_code, output_name, job.timeout)
                    .await
            }
            JobKind::Install {
                target,
                mode,
                auth_token,
            } => {
                self.install(target, mode, auth_token, &job.destination, job.timeout)
                    .await
            }
            JobKind::Publish { source } => {
                let published = self.artifacts.publish(source, job.target()).await?;
                let mut message = format!("published {} to {}", published.name, published.destination);
                if published.replaced {
                    message.push_str(" (replaced existing copy)");
                }
                Ok(JobReport::new(message))
            }
            JobKind::Store { local_path, folder } => {
                let destination = self.artifacts.store(local_path, folder).await?;
                Ok(JobReport::new(format!(
                    "stored {} in {}",
                    local_path.display(),
                    destination
                )))
            }
            JobKind::Fetch {
                remote_path,
                local_destination,
            } => {
                self.artifacts.fetch(remote_path, local_destination).await?;
                Ok(JobReport::new(format!(
                    "fetched {} to {}",
                    remote_path,
                    local_destination.display()
                )))
            }
            JobKind::Delete { name } => {
                self.artifacts.delete(name).await?;
                Ok(JobReport::new(format!("deleted {}", name)))
            }
            JobKind::ListArtifacts => self.list_artifacts().await,
            JobKind::SyncCredentials => self.sync_credentials(&job.workers).await,
        }
    }

    async fn execute(
        &self,
        worker: &Worker,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, JobFailure> {
        self.remote
            .execute(&worker.address, &worker.credential, command, timeout)
            .await
            .map_err(exec_failure)
    }

    async fn probe(&self, worker: &Worker, timeout: Duration) -> Result<JobReport, JobFailure> {
        let output = self.execute(worker, PROBE_COMMAND, timeout).await?;
        if !output.stdout.contains("OK") {
            return Err(non_zero(&output));
        }
        let summary = output.stdout.replacen("OK\n", "", 1);
        Ok(JobReport::new(format!("{} is reachable", worker.address)).with_output(summary.trim()))
    }

    async fn command(
        &self,
        worker: &Worker,
        command: &str,
        timeout: Duration,
    ) -> Result<JobReport, JobFailure> {
        let output = self.execute(worker, command, timeout).await?;
        if !output.success() {
            return Err(non_zero(&output));
        }
        let combined = output.combined();
        let report = JobReport::new("exit 0");
        Ok(if combined.trim().is_empty() {
            report
        } else {
            report.with_output(combined.trim_end())
        })
    }

    async fn make_dir(
        &self,
        worker: &Worker,
        path: &str,
        timeout: Duration,
    ) -> Result<JobReport, JobFailure> {
        let quoted = shell_quote(path);
        let command = format!("mkdir -p {q} && echo SUCCESS && ls -la {q}", q = quoted);
        let output = self.execute(worker, &command, timeout).await?;
        if !output.stdout.contains("SUCCESS") {
            return Err(non_zero(&output));
        }
        let listing = output.stdout.replacen("SUCCESS\n", "", 1);
        Ok(JobReport::new(format!("created {}", path)).with_output(listing.trim()))
    }

    async fn list_worker_images(
        &self,
        worker: &Worker,
        timeout: Duration,
    ) -> Result<JobReport, JobFailure> {
        let dir = &self.settings.store.worker_images_dir;
        let command = format!("ls -lhS {}/", shell_quote(dir));
        let output = self.execute(worker, &command, timeout).await?;
        if !output.success() {
            return Err(non_zero(&output));
        }
        let images = parse_ls_long(&output.stdout);
        if images.is_empty() {
            return Ok(JobReport::new(format!("no images in {}", dir)));
        }
        let rows: Vec<String> = images
            .iter()
            .map(|image| format!("{} ({})", image.name, image.size))
            .collect();
        Ok(JobReport::new(format!("{} images in {}", images.len(), dir)).with_output(&rows.join("\n")))
    }

    async fn build_image(
        &self,
        worker: &Worker,
        os_code: &str,
        output_name: &str,
        timeout: Duration,
    ) -> Result<JobReport, JobFailure> {
        let output_name = if output_name.trim().is_empty() {
            default_output_name(os_code)
        } else {
            output_name.to_string()
        };
        let script = self.settings.paths.build_script_path();
        let uploaded = self
            .remote
            .upload(
                &worker.address,
                &worker.credential,
                &script,
                REMOTE_BUILD_SCRIPT,
                self.settings.timeouts.probe,
            )
            .await
            .map_err(exec_failure)?;
        if !uploaded.success() {
            return Err(non_zero(&uploaded));
        }

        let command = CommandSpec::new("bash")
            .args([REMOTE_BUILD_SCRIPT, os_code, output_name.as_str()])
            .to_shell();
        let output = self.execute(worker, &command, timeout).await?;
        let combined = output.combined();
        if !output.stdout.contains(BUILD_MARKER) {
            return Err(JobFailure::NonZeroExit {
                code: output.exit_code,
                output: tail(&combined, PREVIEW_LIMIT),
            });
        }
        Ok(JobReport {
            message: format!("built {} for {}", output_name, os_code),
            output: Some(tail(&combined, PREVIEW_LIMIT)),
        })
    }

    async fn install(
        &self,
        target: &InstallTarget,
        mode: &InstallMode,
        auth_token: &Secret,
        destination: &str,
        timeout: Duration,
    ) -> Result<JobReport, JobFailure> {
        let script = self.settings.paths.install_script_path();
        let mut spec = CommandSpec::new("bash").args([
            script.to_string_lossy().into_owned(),
            target.address.clone(),
            target.credential.expose().to_string(),
        ]);
        spec = match mode {
            InstallMode::Image { image } => spec.args([image.as_str(), destination, auth_token.expose()]),
            InstallMode::Docker { os_code, artifact } => {
                let spec = spec.args([os_code.as_str(), destination, auth_token.expose()]);
                match artifact {
                    Some(artifact) => spec.arg(artifact.as_str()),
                    None => spec,
                }
            }
        };

        let result = self.local.run(&spec, timeout).await;
        if let Err(e) = append_install_log(
            &self.settings.paths.install_log_path(),
            destination,
            target,
            mode,
            &result,
        ) {
            tracing::warn!(error = %e, "failed to append install log");
        }

        let output = result.map_err(exec_failure)?;
        if !output.success() {
            return Err(JobFailure::NonZeroExit {
                code: output.exit_code,
                output: tail(&output.combined(), PREVIEW_LIMIT),
            });
        }
        Ok(JobReport {
            message: format!("install finished on {}", target.address),
            output: Some(tail(&output.combined(), PREVIEW_LIMIT)).filter(|o| !o.trim().is_empty()),
        })
    }

    async fn list_artifacts(&self) -> Result<JobReport, JobFailure> {
        let artifacts = self.artifacts.list().await?;
        let collection = self.artifacts.settings().collection_path();
        if artifacts.is_empty() {
            return Ok(JobReport::new(format!("no artifacts in {}", collection)));
        }
        let golden = artifacts.iter().filter(|a| a.is_golden).count();
        let rows: Vec<String> = golden_first(&artifacts)
            .into_iter()
            .map(|a| {
                let marker = if a.is_golden { "⭐" } else { "💿" };
                format!("{} {} ({})", marker, a.path, a.human_size())
            })
            .collect();
        Ok(JobReport::new(format!(
            "{} artifacts in {} ({} golden)",
            artifacts.len(),
            collection,
            golden
        ))
        .with_output(&rows.join("\n")))
    }

    /// Push the credential file to each worker in turn
    async fn sync_credentials(&self, workers: &[Worker]) -> Result<JobReport, JobFailure> {
        let config = self
            .credentials
            .contents()
            .map_err(|e| JobFailure::Config(e.to_string()))?;
        let script = sync_script(&config, self.credentials.remote());

        let mut lines = Vec::with_capacity(workers.len());
        let mut failed = 0;
        for worker in workers {
            let result = self
                .remote
                .execute(
                    &worker.address,
                    &worker.credential,
                    &script,
                    self.settings.timeouts.sync_per_worker,
                )
                .await;
            let sync = SyncResult::from_exec(&result);
            if !sync.is_synced() {
                failed += 1;
            }
            tracing::info!(worker = %worker.id, synced = sync.is_synced(), "credential sync");
            lines.push(
                SyncLine {
                    worker: &worker.name,
                    result: &sync,
                }
                .to_string(),
            );
        }

        let output = lines.join("\n");
        if failed > 0 {
            return Err(JobFailure::Partial {
                failed,
                total: workers.len(),
                output,
            });
        }
        Ok(JobReport::new(format!("synced {} workers", workers.len())).with_output(&output))
    }
}

fn target(job: &Job) -> Result<&Worker, JobFailure> {
    job.target()
        .ok_or_else(|| JobFailure::Internal(format!("{} job has no worker", job.kind.name())))
}

/// Map a channel error onto the job failure taxonomy
pub fn exec_failure(error: ExecError) -> JobFailure {
    match error {
        ExecError::Connect { address, reason } => JobFailure::Connect { address, reason },
        ExecError::Timeout { after } => JobFailure::Timeout { after },
        ExecError::Spawn { .. } => JobFailure::Config(error.to_string()),
    }
}

fn non_zero(output: &ExecOutput) -> JobFailure {
    JobFailure::NonZeroExit {
        code: output.exit_code,
        output: preview(&output.combined(), PREVIEW_LIMIT),
    }
}

/// Append one install record; the credential is never written
fn append_install_log(
    path: &Path,
    destination: &str,
    target: &InstallTarget,
    mode: &InstallMode,
    result: &Result<ExecOutput, ExecError>,
) -> std::io::Result<()> {
    let (os, kind, image) = match mode {
        InstallMode::Docker { os_code, artifact } => {
            (os_code.as_str(), "docker", artifact.as_deref().unwrap_or(""))
        }
        InstallMode::Image { image } => ("", "image", image.as_str()),
    };
    let (output, exit_code) = match result {
        Ok(output) => (
            output.combined(),
            output.exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()),
        ),
        Err(e) => (e.to_string(), "none".to_string()),
    };

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    write!(
        file,
        "\n{}\nUser: {} | IP: {} | OS: {} | Type: {} | Image: {}\n{}\nExit code: {}\n",
        "=".repeat(50),
        destination,
        target.address,
        os,
        kind,
        image,
        output,
        exit_code
    )
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
