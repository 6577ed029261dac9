// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake command host for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CommandHost, CommandSpec, ExecError, ExecOutput};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A canned reply, optionally delayed
#[derive(Debug, Clone)]
pub struct FakeReply {
    pub result: Result<ExecOutput, ExecError>,
    pub delay: Duration,
}

impl FakeReply {
    /// Exit 0 with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::exit(0, stdout, "")
    }

    pub fn exit(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            result: Ok(ExecOutput {
                stdout: stdout.into(),
                stderr: stderr.into(),
                exit_code: Some(code),
            }),
            delay: Duration::ZERO,
        }
    }

    pub fn error(error: ExecError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    /// Take `delay` before answering. A delay past the caller's timeout
    /// answers with a timeout instead.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) async fn deliver(self, timeout: Duration) -> Result<ExecOutput, ExecError> {
        if self.delay > timeout {
            tokio::time::sleep(timeout).await;
            return Err(ExecError::Timeout { after: timeout });
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result
    }
}

#[derive(Default)]
struct ScriptState {
    once: Vec<(String, FakeReply)>,
    always: Vec<(String, FakeReply)>,
}

/// Replies keyed by a substring of the command line.
///
/// One-shot replies are consumed in the order they were queued; standing
/// replies are checked newest first. Unmatched commands succeed with no output.
#[derive(Clone, Default)]
pub struct Script {
    state: Arc<Mutex<ScriptState>>,
}

impl Script {
    /// Answer every command containing `pattern`
    pub fn on(&self, pattern: impl Into<String>, reply: FakeReply) {
        self.lock().always.push((pattern.into(), reply));
    }

    /// Answer the next command containing `pattern`, once
    pub fn once(&self, pattern: impl Into<String>, reply: FakeReply) {
        self.lock().once.push((pattern.into(), reply));
    }

    pub fn reply_for(&self, line: &str) -> FakeReply {
        let mut state = self.lock();
        if let Some(idx) = state.once.iter().position(|(p, _)| line.contains(p.as_str())) {
            return state.once.remove(idx).1;
        }
        state
            .always
            .iter()
            .rev()
            .find(|(p, _)| line.contains(p.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| FakeReply::ok(""))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Recorded command
#[derive(Debug, Clone)]
pub struct ExecCall {
    pub spec: CommandSpec,
    pub timeout: Duration,
}

impl ExecCall {
    /// Program and arguments joined by spaces, unquoted
    pub fn line(&self) -> String {
        std::iter::once(self.spec.program.as_str())
            .chain(self.spec.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Fake command host for testing
#[derive(Clone, Default)]
pub struct FakeCommandHost {
    script: Script,
    calls: Arc<Mutex<Vec<ExecCall>>>,
}

impl FakeCommandHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn on(&self, pattern: impl Into<String>, reply: FakeReply) -> &Self {
        self.script.on(pattern, reply);
        self
    }

    pub fn once(&self, pattern: impl Into<String>, reply: FakeReply) -> &Self {
        self.script.once(pattern, reply);
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Command lines of all recorded calls
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(ExecCall::line).collect()
    }
}

#[async_trait]
impl CommandHost for FakeCommandHost {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<ExecOutput, ExecError> {
        let call = ExecCall {
            spec: spec.clone(),
            timeout,
        };
        let reply = self.script.reply_for(&call.line());
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        reply.deliver(timeout).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
