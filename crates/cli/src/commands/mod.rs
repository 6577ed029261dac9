// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod artifact;
pub mod creds;
pub mod job;
pub mod worker;

use crate::adapters;
use crate::error::CliError;
use crate::output;
use anyhow::Result;
use clap::Args;
use fleet_adapters::ChannelNotifyAdapter;
use fleet_core::{JobKind, Settings, TargetSpec};
use fleet_engine::{Fleet, JobRequest};
use std::process::ExitCode;

/// Notification destination for jobs started from a terminal
pub const DESTINATION: &str = "cli";

/// Worker selection shared by job commands
#[derive(Args)]
pub struct TargetArgs {
    /// Worker id (defaults to the active worker)
    #[arg(short = 'w', long = "worker")]
    pub worker: Option<String>,
}

impl TargetArgs {
    pub fn target(self) -> TargetSpec {
        match self.worker {
            Some(id) => TargetSpec::Worker(id),
            None => TargetSpec::Active,
        }
    }
}

/// A request reporting to the terminal
pub fn request(kind: JobKind, target: TargetSpec) -> JobRequest {
    JobRequest::new(kind, target, DESTINATION)
}

/// Dispatch one job, print its notification and map the outcome to an exit code
pub async fn run_job(fleet: Fleet, settings: Settings, request: JobRequest) -> Result<ExitCode> {
    let (notify, rx) = ChannelNotifyAdapter::new();
    let printer = output::spawn_printer(rx);

    let outcome = {
        let runner = adapters::make_runner(fleet, settings, notify);
        let handle = runner.dispatch(request).map_err(CliError::from)?;
        tracing::debug!(job_id = handle.id(), "waiting for job");
        handle.wait().await?
    };
    printer.await?;

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
