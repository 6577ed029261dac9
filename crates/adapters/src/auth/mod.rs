// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth device authorization endpoints

mod google;

pub use google::{parse_code_response, parse_poll_response, GoogleDeviceAuth};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AuthCall, FakeAuthServer};

use async_trait::async_trait;
use fleet_core::{DeviceCode, PollResponse, Secret};
use thiserror::Error;

/// Errors talking to the authorization server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(String),
    /// The server answered with an error
    #[error("server rejected request: {error}{}", description.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default())]
    Rejected {
        error: String,
        description: Option<String>,
    },
    #[error("unexpected response: {0}")]
    Malformed(String),
}

/// Adapter for the device authorization endpoints
#[async_trait]
pub trait AuthServerAdapter: Clone + Send + Sync + 'static {
    /// Ask for a device code and user code
    async fn request_code(&self, client_id: &str, scope: &str) -> Result<DeviceCode, AuthError>;

    /// Poll the token endpoint once
    async fn poll(
        &self,
        client_id: &str,
        client_secret: &Secret,
        device_code: &Secret,
    ) -> Result<PollResponse, AuthError>;
}
