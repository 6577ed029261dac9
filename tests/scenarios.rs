// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios across the fleet crates.
//!
//! Each scenario wires the real engine, state file and credential file
//! together and drives the outside world through fakes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "scenarios/prelude.rs"]
mod prelude;

#[path = "scenarios/artifacts.rs"]
mod artifacts;
#[path = "scenarios/authorization.rs"]
mod authorization;
#[path = "scenarios/jobs.rs"]
mod jobs;
#[path = "scenarios/registry.rs"]
mod registry;
