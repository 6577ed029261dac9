// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner factory for CLI commands

use fleet_adapters::{
    ChannelNotifyAdapter, GoogleDeviceAuth, LocalHost, RcloneProvider, SshAdapter, SshOptions,
    StoreTimeouts, TracedAuthServer, TracedRemoteAdapter,
};
use fleet_core::{Settings, SystemClock, UuidIdGen};
use fleet_engine::{Credentials, DeviceAuthFlow, Fleet, JobRunner, RunnerDeps};

pub type Remote = TracedRemoteAdapter<SshAdapter>;
pub type Stores = RcloneProvider<Remote>;
pub type Runner =
    JobRunner<Remote, Stores, LocalHost, ChannelNotifyAdapter, SystemClock, UuidIdGen>;
pub type AuthFlow =
    DeviceAuthFlow<TracedAuthServer<GoogleDeviceAuth>, Stores, ChannelNotifyAdapter, SystemClock>;

fn remote(settings: &Settings) -> Remote {
    TracedRemoteAdapter::new(SshAdapter::new(SshOptions::from(&settings.ssh)))
}

fn stores(settings: &Settings) -> Stores {
    RcloneProvider::new(remote(settings), StoreTimeouts::from(&settings.timeouts))
        .with_local_config(&settings.paths.rclone_config)
}

/// Create a production runner reporting through `notify`
pub fn make_runner(fleet: Fleet, settings: Settings, notify: ChannelNotifyAdapter) -> Runner {
    let deps = RunnerDeps {
        remote: remote(&settings),
        stores: stores(&settings),
        local: LocalHost::in_dir(&settings.paths.scripts_dir),
        notify,
    };
    JobRunner::new(deps, fleet, settings, SystemClock, UuidIdGen)
}

/// Create a production device authorization flow
pub fn make_auth_flow(settings: &Settings, notify: ChannelNotifyAdapter) -> AuthFlow {
    DeviceAuthFlow::new(
        TracedAuthServer::new(GoogleDeviceAuth::new(&settings.auth)),
        stores(settings),
        notify,
        SystemClock,
        Credentials::from_settings(settings),
        settings.auth.scope.clone(),
    )
}
