// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification sink adapters

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

use async_trait::async_trait;
use fleet_core::Notification;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from notification operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification sink closed")]
    Closed,
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Adapter for delivering notifications to the front-end
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Discards every notification
#[derive(Clone, Default)]
pub struct NoOpNotifyAdapter;

impl NoOpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Forwards notifications into a channel the front-end drains
#[derive(Clone)]
pub struct ChannelNotifyAdapter {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifyAdapter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl NotifyAdapter for ChannelNotifyAdapter {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.tx
            .send(notification.clone())
            .map_err(|_| NotifyError::Closed)
    }
}
