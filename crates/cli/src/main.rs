// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fleet - Builder fleet orchestrator CLI

mod adapters;
mod commands;
mod error;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{artifact, creds, job, worker};
use fleet_core::Settings;
use fleet_engine::Fleet;
use fleet_storage::{BotState, StateStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fleet",
    version,
    about = "Builder fleet orchestrator - workers, image jobs and the artifact store"
)]
struct Cli {
    /// Settings file (defaults to $FLEET_CONFIG, then ./fleet.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Worker registry management
    Worker(worker::WorkerArgs),
    /// Run a job on a worker
    Job(job::JobArgs),
    /// Artifact store operations
    Artifact(artifact::ArtifactArgs),
    /// Store credentials and authorization
    Creds(creds::CredsArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let base = std::env::current_dir()?;
    let settings = Settings::from_env(cli.config.as_deref(), &base)?;
    let store = StateStore::new(&settings.paths.state_file);
    let fleet = Fleet::open(store, || BotState::for_owner(None)).with_context(|| {
        format!(
            "failed to open state file {}",
            settings.paths.state_file.display()
        )
    })?;

    match cli.command {
        Commands::Worker(args) => {
            worker::handle(args.command, &fleet)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Job(args) => job::handle(args.command, fleet, settings).await,
        Commands::Artifact(args) => artifact::handle(args.command, fleet, settings).await,
        Commands::Creds(args) => creds::handle(args.command, fleet, settings).await,
    }
}

/// Logs go to stderr so command output stays pipeable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
