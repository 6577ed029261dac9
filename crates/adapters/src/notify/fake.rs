// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notification adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use fleet_core::Notification;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Fake notification adapter for testing
#[derive(Clone, Default)]
pub struct FakeNotifyAdapter {
    calls: Arc<Mutex<Vec<Notification>>>,
    delivered: Arc<Notify>,
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded notifications
    pub fn calls(&self) -> Vec<Notification> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Messages only, in delivery order
    pub fn messages(&self) -> Vec<String> {
        self.calls().into_iter().map(|n| n.message).collect()
    }

    /// Wait until at least `count` notifications have arrived
    pub async fn wait_for(&self, count: usize) -> Vec<Notification> {
        loop {
            let notified = self.delivered.notified();
            let calls = self.calls();
            if calls.len() >= count {
                return calls;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
        self.delivered.notify_waiters();
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
