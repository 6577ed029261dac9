// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O

pub mod auth;
pub mod exec;
pub mod notify;
pub mod remote;
pub mod store;
pub mod traced;

pub use auth::{AuthError, AuthServerAdapter, GoogleDeviceAuth};
pub use exec::{CommandHost, CommandSpec, ExecError, ExecOutput, LocalHost};
pub use notify::{ChannelNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use remote::{RemoteAdapter, SshAdapter, SshOptions, WorkerHost};
pub use store::{
    ObjectStoreAdapter, RcloneProvider, RcloneStore, StoreError, StoreProvider, StoreTimeouts,
};
pub use traced::{TracedAuthServer, TracedObjectStore, TracedRemoteAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use auth::{AuthCall, FakeAuthServer};
#[cfg(any(test, feature = "test-support"))]
pub use exec::{ExecCall, FakeCommandHost, FakeReply};
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use remote::{FakeRemoteAdapter, RemoteCall};
#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeObjectStore, FakeStoreProvider, StoreCall};
