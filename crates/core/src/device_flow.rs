// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device authorization state machine
//!
//! ```text
//! Unstarted -> CodeRequested -> Polling -> Authorized | Expired | Denied | Error
//! ```
//!
//! Pure: every transition takes the current monotonic time and returns the
//! effects the driver must perform (request, present, poll, sleep, persist).
//! Polling happens first, then the driver sleeps the returned interval.

use crate::clock::Clock;
use crate::credential::TokenGrant;
use crate::secret::Secret;
use std::time::{Duration, Instant};

/// Floor for the poll interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Added to the interval each time the server says `slow_down`
pub const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Device and user codes issued by the authorization server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCode {
    pub device_code: Secret,
    pub user_code: String,
    pub verification_url: String,
    pub interval: Duration,
    pub expires_in: Duration,
}

/// Classified token-endpoint response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResponse {
    Pending,
    SlowDown,
    Denied,
    Expired,
    /// Any other error string, surfaced verbatim
    Error(String),
    Token(TokenGrant),
}

impl PollResponse {
    /// Classify an `error` field from the token endpoint
    pub fn from_error(error: &str) -> Self {
        match error {
            "authorization_pending" => Self::Pending,
            "slow_down" => Self::SlowDown,
            "access_denied" => Self::Denied,
            "expired_token" => Self::Expired,
            other => Self::Error(other.to_string()),
        }
    }
}

/// State of the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Unstarted,
    CodeRequested,
    Polling {
        interval: Duration,
        deadline: Instant,
        polls: u32,
    },
    Authorized,
    Expired,
    Denied,
    Error { reason: String },
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Authorized | Self::Expired | Self::Denied | Self::Error { .. }
        )
    }
}

/// Events that drive the flow
#[derive(Debug, Clone)]
pub enum FlowEvent {
    /// Begin; carries whether a client id is configured
    Start { has_client: bool },
    CodeIssued(DeviceCode),
    CodeRequestFailed { reason: String },
    /// The previous sleep finished
    Woke,
    Polled(PollResponse),
    /// The poll never reached the server
    TransportError { reason: String },
}

/// Work the driver performs in response to a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEffect {
    RequestCode,
    Present(DeviceCode),
    Poll { device_code: Secret },
    Sleep(Duration),
    Persist(TokenGrant),
    /// Terminal state reached; tell the user
    Report(FlowState),
}

/// The flow: state plus the issued code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFlow {
    pub state: FlowState,
    pub code: Option<DeviceCode>,
}

impl Default for DeviceFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Unstarted,
            code: None,
        }
    }

    /// Number of poll attempts made so far
    pub fn polls(&self) -> u32 {
        match self.state {
            FlowState::Polling { polls, .. } => polls,
            _ => 0,
        }
    }

    pub fn transition(&self, event: FlowEvent, clock: &impl Clock) -> (DeviceFlow, Vec<FlowEffect>) {
        let now = clock.now();

        match (&self.state, event) {
            (FlowState::Unstarted, FlowEvent::Start { has_client: false }) => self.finish(
                FlowState::Error {
                    reason: "client id is not configured".to_string(),
                },
            ),
            (FlowState::Unstarted, FlowEvent::Start { has_client: true }) => (
                DeviceFlow {
                    state: FlowState::CodeRequested,
                    ..self.clone()
                },
                vec![FlowEffect::RequestCode],
            ),

            (FlowState::CodeRequested, FlowEvent::CodeRequestFailed { reason }) => {
                self.finish(FlowState::Error { reason })
            }
            (FlowState::CodeRequested, FlowEvent::CodeIssued(code)) => {
                let interval = code.interval.max(MIN_POLL_INTERVAL);
                let flow = DeviceFlow {
                    state: FlowState::Polling {
                        interval,
                        deadline: now + code.expires_in,
                        polls: 0,
                    },
                    code: Some(code.clone()),
                };
                let effects = vec![FlowEffect::Present(code.clone()), self.poll_effect(&code)];
                (flow, effects)
            }

            (FlowState::Polling { deadline, .. }, FlowEvent::Woke) => {
                if now >= *deadline {
                    return self.finish(FlowState::Expired);
                }
                match &self.code {
                    Some(code) => (self.clone(), vec![self.poll_effect(code)]),
                    None => self.finish(FlowState::Error {
                        reason: "polling without a device code".to_string(),
                    }),
                }
            }

            (
                FlowState::Polling {
                    interval,
                    deadline,
                    polls,
                },
                FlowEvent::Polled(response),
            ) => {
                let polls = polls + 1;
                let wait = |interval: Duration| {
                    (
                        DeviceFlow {
                            state: FlowState::Polling {
                                interval,
                                deadline: *deadline,
                                polls,
                            },
                            code: self.code.clone(),
                        },
                        vec![FlowEffect::Sleep(interval)],
                    )
                };
                match response {
                    PollResponse::Pending => wait(*interval),
                    PollResponse::SlowDown => wait(*interval + SLOW_DOWN_STEP),
                    PollResponse::Denied => self.finish(FlowState::Denied),
                    PollResponse::Expired => self.finish(FlowState::Expired),
                    PollResponse::Error(reason) => self.finish(FlowState::Error { reason }),
                    PollResponse::Token(grant) if grant.access_token.is_empty() => wait(*interval),
                    PollResponse::Token(grant) => {
                        let (flow, mut effects) = self.finish(FlowState::Authorized);
                        effects.insert(0, FlowEffect::Persist(grant));
                        (flow, effects)
                    }
                }
            }

            (
                FlowState::Polling {
                    interval,
                    deadline,
                    polls,
                },
                FlowEvent::TransportError { .. },
            ) => {
                let backoff = (*interval).max(MIN_POLL_INTERVAL);
                (
                    DeviceFlow {
                        state: FlowState::Polling {
                            interval: *interval,
                            deadline: *deadline,
                            polls: polls + 1,
                        },
                        code: self.code.clone(),
                    },
                    vec![FlowEffect::Sleep(backoff)],
                )
            }

            // Anything else is ignored
            _ => (self.clone(), vec![]),
        }
    }

    fn poll_effect(&self, code: &DeviceCode) -> FlowEffect {
        FlowEffect::Poll {
            device_code: code.device_code.clone(),
        }
    }

    fn finish(&self, state: FlowState) -> (DeviceFlow, Vec<FlowEffect>) {
        let flow = DeviceFlow {
            state: state.clone(),
            code: self.code.clone(),
        };
        (flow, vec![FlowEffect::Report(state)])
    }
}

#[cfg(test)]
#[path = "device_flow_tests.rs"]
mod tests;
