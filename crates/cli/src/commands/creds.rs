// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet creds` - Store client, authorization and credential sync

use super::{request, run_job, DESTINATION};
use crate::adapters;
use crate::error::CliError;
use crate::output;
use anyhow::Result;
use clap::{Args, Subcommand};
use fleet_adapters::ChannelNotifyAdapter;
use fleet_core::{FlowState, JobKind, Secret, Settings, TargetSpec};
use fleet_engine::{Credentials, Fleet};
use std::process::ExitCode;

#[derive(Args)]
pub struct CredsArgs {
    #[command(subcommand)]
    pub command: CredsCommand,
}

#[derive(Subcommand)]
pub enum CredsCommand {
    /// Save the OAuth client used for store access (drops any saved token)
    Configure {
        client_id: String,
        #[arg(env = "FLEET_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,
    },
    /// Authorize store access with a device code
    Auth,
    /// Push the credential file to workers
    Sync {
        /// Only this worker (defaults to every enabled worker)
        #[arg(short = 'w', long = "worker")]
        worker: Option<String>,
    },
}

pub async fn handle(command: CredsCommand, fleet: Fleet, settings: Settings) -> Result<ExitCode> {
    match command {
        CredsCommand::Configure {
            client_id,
            client_secret,
        } => {
            let credentials = Credentials::from_settings(&settings);
            credentials
                .configure(&client_id, &Secret::new(client_secret))
                .map_err(CliError::from)?;
            println!(
                "Saved store client to {}",
                credentials.file().path().display()
            );
            println!("Run `fleet creds auth` to authorize it");
            Ok(ExitCode::SUCCESS)
        }
        CredsCommand::Auth => authorize(&settings).await,
        CredsCommand::Sync { worker } => {
            let target = match worker {
                Some(id) => TargetSpec::Worker(id),
                None => TargetSpec::AllEnabled,
            };
            run_job(fleet, settings, request(JobKind::SyncCredentials, target)).await
        }
    }
}

async fn authorize(settings: &Settings) -> Result<ExitCode> {
    let (notify, rx) = ChannelNotifyAdapter::new();
    let printer = output::spawn_printer(rx);

    let outcome = {
        let flow = adapters::make_auth_flow(settings, notify);
        flow.run(DESTINATION).await
    };
    printer.await?;

    tracing::debug!(polls = outcome.polls, verified = outcome.verified, "flow finished");
    Ok(match outcome.state {
        FlowState::Authorized => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
