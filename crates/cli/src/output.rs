// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use fleet_core::{Notification, Worker};
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + fmt::Display>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for item in items {
                println!("{}", item);
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(items) {
                println!("{}", json);
            }
        }
    }
}

/// A worker as shown to the operator; the credential is never included
#[derive(Debug, Serialize)]
pub struct WorkerView {
    pub id: String,
    pub name: String,
    pub address: String,
    pub enabled: bool,
    pub active: bool,
}

impl WorkerView {
    pub fn new(worker: &Worker, active: Option<&str>) -> Self {
        Self {
            id: worker.id.clone(),
            name: worker.name.clone(),
            address: worker.address.clone(),
            enabled: worker.enabled,
            active: active == Some(worker.id.as_str()),
        }
    }
}

impl fmt::Display for WorkerView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.active { "*" } else { " " };
        let state = if self.enabled { "enabled" } else { "disabled" };
        write!(
            f,
            "{} {}  {} ({})  {}",
            marker, self.id, self.name, self.address, state
        )
    }
}

/// Print notifications as they arrive; ends once every sender is dropped
pub fn spawn_printer(mut rx: UnboundedReceiver<Notification>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            println!("{}", notification.message);
            for attachment in &notification.attachments {
                println!("📎 {}", attachment.display());
            }
        }
    })
}
