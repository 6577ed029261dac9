// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet artifact` - Artifact store operations

use super::{request, run_job, TargetArgs};
use anyhow::Result;
use clap::{Args, Subcommand};
use fleet_core::{JobKind, PublishSource, Settings, TargetSpec};
use fleet_engine::Fleet;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args)]
pub struct ArtifactArgs {
    #[command(subcommand)]
    pub command: ArtifactCommand,
}

#[derive(Subcommand)]
pub enum ArtifactCommand {
    /// List stored images, golden ones first
    List,
    /// Upload an image to the collection, replacing a same-named copy
    Publish {
        /// Image file; with --from-worker a path or file name on the worker
        path: String,
        /// Upload from a worker instead of this machine
        #[arg(long)]
        from_worker: bool,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Copy a local file into the store
    Store {
        local_path: PathBuf,
        /// Folder in the store (defaults to the collection)
        #[arg(long, default_value = "")]
        folder: String,
    },
    /// Download a stored file
    Fetch {
        /// Store path, with or without the `remote:` prefix
        remote_path: String,
        /// Local destination directory or file
        destination: PathBuf,
    },
    /// Delete an image from the collection
    Delete { name: String },
}

pub async fn handle(
    command: ArtifactCommand,
    fleet: Fleet,
    settings: Settings,
) -> Result<ExitCode> {
    let job = match command {
        ArtifactCommand::List => request(JobKind::ListArtifacts, TargetSpec::None),
        ArtifactCommand::Publish {
            path,
            from_worker,
            target,
        } => {
            if from_worker {
                request(
                    JobKind::Publish {
                        source: PublishSource::Worker { path },
                    },
                    target.target(),
                )
            } else {
                request(
                    JobKind::Publish {
                        source: PublishSource::Local {
                            path: PathBuf::from(path),
                        },
                    },
                    TargetSpec::None,
                )
            }
        }
        ArtifactCommand::Store { local_path, folder } => {
            request(JobKind::Store { local_path, folder }, TargetSpec::None)
        }
        ArtifactCommand::Fetch {
            remote_path,
            destination,
        } => request(
            JobKind::Fetch {
                remote_path,
                local_destination: destination,
            },
            TargetSpec::None,
        ),
        ArtifactCommand::Delete { name } => request(JobKind::Delete { name }, TargetSpec::None),
    };
    run_job(fleet, settings, job).await
}
