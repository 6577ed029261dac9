// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates unique job identifiers
pub trait IdGen: Clone + Send + Sync + 'static {
    fn next(&self) -> String;
}

/// UUID-based generator for production use
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("job-{}", &id[..12])
    }
}

/// Sequential generator for testing
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("job")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

/// Derive a worker id from its position in the list and its address.
///
/// `worker_id(2, "10.0.0.5")` is `"tumbal2_10_0_0_5"`.
pub fn worker_id(sequence: usize, address: &str) -> String {
    let address: String = address
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("tumbal{}_{}", sequence, address)
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
