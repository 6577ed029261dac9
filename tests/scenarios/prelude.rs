// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared world for scenario tests

#![allow(dead_code)]

pub use fleet_adapters::{
    FakeAuthServer, FakeCommandHost, FakeNotifyAdapter, FakeRemoteAdapter, FakeReply,
    FakeStoreProvider, RemoteAdapter,
};
pub use fleet_core::{
    FakeClock, JobKind, JobOutcome, JobStatus, Secret, SequentialIdGen, Settings, TargetSpec,
};
pub use fleet_engine::{Credentials, Fleet, JobRequest, JobRunner, RunnerDeps};
pub use fleet_storage::{BotState, StateStore};
pub use std::time::Duration;

use tempfile::TempDir;

pub const GIB: u64 = 1024 * 1024 * 1024;

/// One orchestrator instance with its files in a temp directory
pub struct World<R: RemoteAdapter> {
    pub dir: TempDir,
    pub settings: Settings,
    pub fleet: Fleet,
    pub remote: R,
    pub stores: FakeStoreProvider,
    pub local: FakeCommandHost,
    pub notify: FakeNotifyAdapter,
    pub clock: FakeClock,
    pub runner: JobRunner<
        R,
        FakeStoreProvider,
        FakeCommandHost,
        FakeNotifyAdapter,
        FakeClock,
        SequentialIdGen,
    >,
}

impl World<FakeRemoteAdapter> {
    pub fn new() -> Self {
        Self::with_remote(FakeRemoteAdapter::new())
    }
}

impl<R: RemoteAdapter> World<R> {
    pub fn with_remote(remote: R) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.state_file = dir.path().join("bot_data.json");
        settings.paths.rclone_config = dir.path().join("rclone.conf");
        settings.paths.scripts_dir = dir.path().to_path_buf();

        let fleet = open_fleet(&settings);
        let stores = FakeStoreProvider::new();
        let local = FakeCommandHost::new();
        let notify = FakeNotifyAdapter::new();
        let clock = FakeClock::new();
        let runner = JobRunner::new(
            RunnerDeps {
                remote: remote.clone(),
                stores: stores.clone(),
                local: local.clone(),
                notify: notify.clone(),
            },
            fleet.clone(),
            settings.clone(),
            clock.clone(),
            SequentialIdGen::default(),
        );
        Self {
            dir,
            settings,
            fleet,
            remote,
            stores,
            local,
            notify,
            clock,
            runner,
        }
    }

    /// A second process opening the same state file
    pub fn reopen(&self) -> Fleet {
        open_fleet(&self.settings)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::from_settings(&self.settings)
    }

    /// Dispatch a job reporting to `chat` and wait for its outcome
    pub async fn run(&self, kind: JobKind, target: TargetSpec) -> JobOutcome {
        self.runner
            .dispatch(JobRequest::new(kind, target, "chat"))
            .unwrap()
            .wait()
            .await
            .unwrap()
    }
}

fn open_fleet(settings: &Settings) -> Fleet {
    Fleet::open(StateStore::new(&settings.paths.state_file), || {
        BotState::for_owner(Some(42))
    })
    .unwrap()
}
