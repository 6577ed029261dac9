// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake authorization server for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AuthError, AuthServerAdapter};
use async_trait::async_trait;
use fleet_core::{DeviceCode, PollResponse, Secret};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Recorded authorization call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCall {
    RequestCode { client_id: String, scope: String },
    Poll { client_id: String, device_code: String },
}

#[derive(Default)]
struct AuthState {
    code: Option<Result<DeviceCode, AuthError>>,
    polls: VecDeque<Result<PollResponse, AuthError>>,
    calls: Vec<AuthCall>,
}

/// Scripted authorization server
///
/// Poll replies are consumed in order; once exhausted every poll is pending.
#[derive(Clone, Default)]
pub struct FakeAuthServer {
    inner: Arc<Mutex<AuthState>>,
}

impl FakeAuthServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, code: DeviceCode) -> &Self {
        self.lock().code = Some(Ok(code));
        self
    }

    pub fn fail_code_request(&self, error: AuthError) -> &Self {
        self.lock().code = Some(Err(error));
        self
    }

    pub fn reply(&self, response: PollResponse) -> &Self {
        self.lock().polls.push_back(Ok(response));
        self
    }

    pub fn reply_error(&self, error: AuthError) -> &Self {
        self.lock().polls.push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<AuthCall> {
        self.lock().calls.clone()
    }

    pub fn poll_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, AuthCall::Poll { .. }))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AuthState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AuthServerAdapter for FakeAuthServer {
    async fn request_code(&self, client_id: &str, scope: &str) -> Result<DeviceCode, AuthError> {
        let mut state = self.lock();
        state.calls.push(AuthCall::RequestCode {
            client_id: client_id.to_string(),
            scope: scope.to_string(),
        });
        state
            .code
            .clone()
            .unwrap_or_else(|| Err(AuthError::Transport("no device code scripted".to_string())))
    }

    async fn poll(
        &self,
        client_id: &str,
        _client_secret: &Secret,
        device_code: &Secret,
    ) -> Result<PollResponse, AuthError> {
        let mut state = self.lock();
        state.calls.push(AuthCall::Poll {
            client_id: client_id.to_string(),
            device_code: device_code.expose().to_string(),
        });
        state.polls.pop_front().unwrap_or(Ok(PollResponse::Pending))
    }
}
