// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet job` - Remote work on workers and customer hosts

use super::{request, run_job, TargetArgs};
use anyhow::Result;
use clap::{Args, Subcommand};
use fleet_core::{InstallMode, InstallTarget, JobKind, Secret, Settings, TargetSpec};
use fleet_engine::{default_output_name, Fleet, JobRequest};
use std::process::ExitCode;

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Check that a worker is reachable and show memory and disk
    Probe {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Run a shell command on a worker
    Exec {
        #[command(flatten)]
        target: TargetArgs,
        /// Command and its arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
    /// Create a directory on a worker
    Mkdir {
        #[command(flatten)]
        target: TargetArgs,
        path: String,
    },
    /// List image files in the worker's image folder
    Images {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Build a golden image on a worker
    Build {
        #[command(flatten)]
        target: TargetArgs,
        /// OS code, e.g. win10
        os: String,
        /// Output image name (defaults to golden-<os>)
        #[arg(long)]
        output: Option<String>,
    },
    /// Install an OS on a customer host
    Install {
        /// Customer host address
        address: String,
        /// Customer host root password
        #[arg(long, env = "FLEET_INSTALL_PASSWORD", hide_env_values = true)]
        password: String,
        /// Restore this prebuilt image instead of a container install
        #[arg(long, conflicts_with_all = ["os", "artifact"])]
        image: Option<String>,
        /// OS code for a container install
        #[arg(long, required_unless_present = "image")]
        os: Option<String>,
        /// Stored artifact the container install starts from
        #[arg(long)]
        artifact: Option<String>,
        /// Store access token handed to the install script
        #[arg(long, env = "FLEET_INSTALL_TOKEN", hide_env_values = true, default_value = "")]
        token: String,
        /// Who the install is for, recorded in the install log
        #[arg(long = "for", default_value = "cli")]
        requester: String,
    },
}

pub async fn handle(command: JobCommand, fleet: Fleet, settings: Settings) -> Result<ExitCode> {
    let job = match command {
        JobCommand::Probe { target } => request(JobKind::Probe, target.target()),
        JobCommand::Exec { target, command } => request(
            JobKind::Command {
                command: command.join(" "),
            },
            target.target(),
        ),
        JobCommand::Mkdir { target, path } => request(JobKind::MakeDir { path }, target.target()),
        JobCommand::Images { target } => request(JobKind::ListWorkerImages, target.target()),
        JobCommand::Build { target, os, output } => {
            let output_name = output.unwrap_or_else(|| default_output_name(&os));
            request(
                JobKind::BuildImage {
                    os_code: os,
                    output_name,
                },
                target.target(),
            )
        }
        JobCommand::Install {
            address,
            password,
            image,
            os,
            artifact,
            token,
            requester,
        } => {
            let mode = match (image, os) {
                (Some(image), _) => InstallMode::Image { image },
                (None, os) => InstallMode::Docker {
                    os_code: os.unwrap_or_default(),
                    artifact,
                },
            };
            let kind = JobKind::Install {
                target: InstallTarget {
                    address,
                    credential: Secret::new(password),
                },
                mode,
                auth_token: Secret::new(token),
            };
            // The requester is the notification destination and the install log's user
            JobRequest::new(kind, TargetSpec::None, requester)
        }
    };
    run_job(fleet, settings, job).await
}
