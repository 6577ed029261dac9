// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet worker` - Worker registry commands

use crate::error::CliError;
use crate::output::{self, OutputFormat, WorkerView};
use anyhow::Result;
use clap::{Args, Subcommand};
use fleet_core::{Secret, WorkerField};
use fleet_engine::Fleet;

#[derive(Args)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerCommand,
}

#[derive(Subcommand)]
pub enum WorkerCommand {
    /// Register a worker (it becomes active if none is)
    Add {
        /// Display name
        name: String,
        /// SSH address
        address: String,
        /// SSH password
        #[arg(long, env = "FLEET_WORKER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Remove a worker
    Remove {
        /// Worker id
        id: String,
    },
    /// Change a worker's name, address or credential
    Update {
        /// Worker id
        id: String,
        /// Field to change: name, address or credential
        field: WorkerField,
        /// New value
        value: String,
    },
    /// Enable a worker
    Enable {
        /// Worker id
        id: String,
    },
    /// Disable a worker (the active pointer moves on if needed)
    Disable {
        /// Worker id
        id: String,
    },
    /// Make a worker the default target for jobs
    Activate {
        /// Worker id
        id: String,
    },
    /// List workers; the active one is marked with `*`
    List {
        #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
        output: OutputFormat,
    },
    /// Show the active worker
    Active {
        #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

pub fn handle(command: WorkerCommand, fleet: &Fleet) -> Result<()> {
    match command {
        WorkerCommand::Add {
            name,
            address,
            password,
        } => {
            let worker = fleet
                .add_worker(&name, &address, Secret::new(password))
                .map_err(CliError::from)?;
            println!("Added {} ({} @ {})", worker.id, worker.name, worker.address);
            if fleet.active().map(|w| w.id) == Some(worker.id) {
                println!("It is now the active worker");
            }
        }
        WorkerCommand::Remove { id } => {
            let worker = fleet.remove_worker(&id).map_err(CliError::from)?;
            println!("Removed {} ({})", worker.id, worker.name);
            report_active(fleet);
        }
        WorkerCommand::Update { id, field, value } => {
            let worker = fleet
                .update_worker(&id, field, &value)
                .map_err(CliError::from)?;
            println!("Updated {} of {}", field, worker.id);
        }
        WorkerCommand::Enable { id } => {
            let worker = fleet.set_enabled(&id, true).map_err(CliError::from)?;
            println!("Enabled {}", worker.id);
        }
        WorkerCommand::Disable { id } => {
            let worker = fleet.set_enabled(&id, false).map_err(CliError::from)?;
            println!("Disabled {}", worker.id);
            report_active(fleet);
        }
        WorkerCommand::Activate { id } => {
            fleet.set_active(&id).map_err(CliError::from)?;
            println!("Active worker is now {}", id);
        }
        WorkerCommand::List { output } => {
            let active = fleet.active().map(|w| w.id);
            let views: Vec<_> = fleet
                .workers()
                .iter()
                .map(|w| WorkerView::new(w, active.as_deref()))
                .collect();
            if views.is_empty() && matches!(output, OutputFormat::Text) {
                println!("No workers registered");
            } else {
                output::print_list(&views, output);
            }
        }
        WorkerCommand::Active { output } => match fleet.active() {
            Some(worker) => output::print(&WorkerView::new(&worker, Some(worker.id.as_str())), output),
            None => println!("No active worker"),
        },
    }
    Ok(())
}

fn report_active(fleet: &Fleet) {
    match fleet.active() {
        Some(worker) => println!("Active worker: {}", worker.id),
        None => println!("No active worker"),
    }
}
