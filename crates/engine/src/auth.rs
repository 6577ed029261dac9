// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device authorization driver
//!
//! Feeds events into the pure [`DeviceFlow`] machine and performs the
//! effects it asks for. Two flows may run at once; the last token written
//! wins.

use crate::credentials::Credentials;
use fleet_adapters::{AuthServerAdapter, NotifyAdapter, ObjectStoreAdapter, StoreProvider};
use fleet_core::{
    Clock, DeviceCode, DeviceFlow, FlowEffect, FlowEvent, FlowState, Notification, TokenRecord,
};
use std::collections::VecDeque;

/// How a flow ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub state: FlowState,
    pub polls: u32,
    /// The store accepted the new token
    pub verified: bool,
}

/// Runs device authorization flows for the store remote
#[derive(Clone)]
pub struct DeviceAuthFlow<A, P, N, C> {
    server: A,
    stores: P,
    notify: N,
    clock: C,
    credentials: Credentials,
    scope: String,
}

impl<A, P, N, C> DeviceAuthFlow<A, P, N, C>
where
    A: AuthServerAdapter,
    P: StoreProvider,
    N: NotifyAdapter,
    C: Clock,
{
    pub fn new(
        server: A,
        stores: P,
        notify: N,
        clock: C,
        credentials: Credentials,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            server,
            stores,
            notify,
            clock,
            credentials,
            scope: scope.into(),
        }
    }

    /// Run one flow to a terminal state, reporting to `destination`
    pub async fn run(&self, destination: &str) -> AuthOutcome {
        let set = match self.credentials.load() {
            Ok(set) => set,
            Err(e) => {
                let state = FlowState::Error {
                    reason: e.to_string(),
                };
                self.say(destination, format!("❌ {}", e)).await;
                return AuthOutcome {
                    state,
                    polls: 0,
                    verified: false,
                };
            }
        };

        let mut flow = DeviceFlow::new();
        let mut verified = false;
        let mut persist_error = None;
        let mut polls = 0;
        let mut events = VecDeque::from([FlowEvent::Start {
            has_client: set.has_client(),
        }]);

        while let Some(event) = events.pop_front() {
            let (next, effects) = flow.transition(event, &self.clock);
            flow = next;
            for effect in effects {
                match effect {
                    FlowEffect::RequestCode => {
                        let event = match self.server.request_code(&set.client_id, &self.scope).await {
                            Ok(code) => FlowEvent::CodeIssued(code),
                            Err(e) => FlowEvent::CodeRequestFailed {
                                reason: e.to_string(),
                            },
                        };
                        events.push_back(event);
                    }
                    FlowEffect::Present(code) => self.say(destination, presentation(&code)).await,
                    FlowEffect::Poll { device_code } => {
                        polls += 1;
                        let event = match self
                            .server
                            .poll(&set.client_id, &set.client_secret, &device_code)
                            .await
                        {
                            Ok(response) => FlowEvent::Polled(response),
                            Err(e) => {
                                tracing::warn!(polls, error = %e, "poll did not reach the server");
                                FlowEvent::TransportError {
                                    reason: e.to_string(),
                                }
                            }
                        };
                        events.push_back(event);
                    }
                    FlowEffect::Sleep(interval) => {
                        self.clock.sleep(interval).await;
                        events.push_back(FlowEvent::Woke);
                    }
                    FlowEffect::Persist(grant) => {
                        let record = TokenRecord::from_grant(&grant, self.clock.utc_now());
                        if let Err(e) = self.credentials.store_token(&record) {
                            tracing::error!(error = %e, "failed to persist token");
                            persist_error = Some(e.to_string());
                        }
                    }
                    FlowEffect::Report(state) => {
                        let message = match (&state, &persist_error) {
                            (FlowState::Authorized, Some(e)) => {
                                format!("❌ Authorized, but the token could not be saved: {}", e)
                            }
                            (FlowState::Authorized, None) => match self.verify().await {
                                Ok(()) => {
                                    verified = true;
                                    "✅ Store authorized and verified.".to_string()
                                }
                                Err(e) => format!(
                                    "⚠️ Token saved, but the store check failed: {}",
                                    e
                                ),
                            },
                            _ => terminal_message(&state, set.has_client()),
                        };
                        tracing::info!(state = ?state, polls, verified, "device flow finished");
                        self.say(destination, message).await;
                        return AuthOutcome {
                            state,
                            polls,
                            verified,
                        };
                    }
                }
            }
        }

        AuthOutcome {
            state: flow.state,
            polls,
            verified,
        }
    }

    /// One call against the store with the new token
    async fn verify(&self) -> Result<(), fleet_adapters::StoreError> {
        self.stores.local().check(self.credentials.remote()).await
    }

    async fn say(&self, destination: &str, message: String) {
        let notification = Notification::new(destination, message);
        if let Err(e) = self.notify.notify(&notification).await {
            tracing::error!(error = %e, "failed to deliver auth message");
        }
    }
}

fn presentation(code: &DeviceCode) -> String {
    format!(
        "🔐 Open {} and enter the code {}\nThe code expires in {} minutes.",
        code.verification_url,
        code.user_code,
        code.expires_in.as_secs().div_ceil(60)
    )
}

fn terminal_message(state: &FlowState, has_client: bool) -> String {
    match state {
        FlowState::Denied => "❌ Authorization was denied. Start the flow again.".to_string(),
        FlowState::Expired => "❌ The device code expired. Start the flow again.".to_string(),
        FlowState::Error { reason } if has_client => format!(
            "❌ Authorization error: {}\nThis usually means the OAuth client is not of type \"TVs and Limited Input devices\". Recreate it, configure credentials again, then restart the flow.",
            reason
        ),
        FlowState::Error { reason } => format!("❌ {}. Configure credentials first.", reason),
        other => format!("❌ Flow stopped in state {:?}", other),
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
