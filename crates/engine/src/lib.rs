// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Builder fleet engine: registry ownership, job dispatch, artifacts and
//! store authorization

mod artifacts;
mod auth;
mod credentials;
mod error;
mod fleet;
mod jobs;
mod runner;

pub use artifacts::{store_failure, ArtifactClient, Published};
pub use auth::{AuthOutcome, DeviceAuthFlow};
pub use credentials::{sync_script, Credentials, SyncLine, SyncResult};
pub use error::{ConfigError, EngineError, PreconditionError};
pub use fleet::Fleet;
pub use jobs::{default_output_name, exec_failure, JobContext};
pub use runner::{JobHandle, JobRequest, JobRunner, RunnerDeps};
