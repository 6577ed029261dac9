// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fleet-core: Core library for the builder fleet orchestrator
//!
//! This crate provides:
//! - The worker registry and its active-worker invariant
//! - Typed job kinds, outcomes and output previews
//! - Artifact classification and listing parsers
//! - The device authorization state machine
//! - Settings, clocks and id generation

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod clock;
pub mod id;
pub mod secret;

pub mod artifact;
pub mod config;
pub mod credential;
pub mod device_flow;
pub mod job;
pub mod notify;
pub mod registry;

// Re-exports
pub use artifact::{human_size, Artifact, ArtifactFilter, LocalImage, StoreEntry};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{Settings, SettingsError};
pub use credential::{CredentialSet, TokenGrant, TokenRecord};
pub use device_flow::{DeviceCode, DeviceFlow, FlowEffect, FlowEvent, FlowState, PollResponse};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use job::{
    InstallMode, InstallTarget, Job, JobFailure, JobKind, JobOutcome, JobReport, JobStatus,
    PublishSource, TargetSpec,
};
pub use notify::Notification;
pub use registry::{Registry, RegistryError, Worker, WorkerField};
pub use secret::Secret;
