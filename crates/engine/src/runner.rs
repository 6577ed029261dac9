// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job runner
//!
//! `dispatch` validates synchronously and returns at once. Each job then
//! runs on its own task under a supervisor that enforces the timeout,
//! turns panics into failures and delivers exactly one notification.

use crate::error::PreconditionError;
use crate::fleet::Fleet;
use crate::jobs::JobContext;
use fleet_adapters::{CommandHost, NotifyAdapter, RemoteAdapter, StoreProvider};
use fleet_core::{
    Clock, IdGen, Job, JobFailure, JobKind, JobOutcome, Notification, PublishSource, TargetSpec,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::Instrument;

/// A job as the front-end asks for it
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub kind: JobKind,
    pub target: TargetSpec,
    /// Where the outcome notification goes
    pub destination: String,
}

impl JobRequest {
    pub fn new(kind: JobKind, target: TargetSpec, destination: impl Into<String>) -> Self {
        Self {
            kind,
            target,
            destination: destination.into(),
        }
    }
}

/// Handle to a running job
#[derive(Debug)]
pub struct JobHandle {
    id: String,
    outcome: oneshot::Receiver<JobOutcome>,
}

impl JobHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the outcome. The notification is sent before this resolves.
    pub async fn wait(self) -> Result<JobOutcome, oneshot::error::RecvError> {
        self.outcome.await
    }
}

/// Adapter dependencies of the runner
pub struct RunnerDeps<R, P, H, N> {
    pub remote: R,
    pub stores: P,
    pub local: H,
    pub notify: N,
}

/// Launches jobs as detached tasks
pub struct JobRunner<R, P, H, N, C: Clock, I: IdGen> {
    fleet: Fleet,
    context: Arc<JobContext<R, P, H>>,
    notify: N,
    clock: C,
    id_gen: I,
}

impl<R, P, H, N, C, I> JobRunner<R, P, H, N, C, I>
where
    R: RemoteAdapter,
    P: StoreProvider,
    H: CommandHost,
    N: NotifyAdapter,
    C: Clock,
    I: IdGen,
{
    pub fn new(
        deps: RunnerDeps<R, P, H, N>,
        fleet: Fleet,
        settings: fleet_core::Settings,
        clock: C,
        id_gen: I,
    ) -> Self {
        Self {
            fleet,
            context: Arc::new(JobContext::new(deps.remote, deps.stores, deps.local, settings)),
            notify: deps.notify,
            clock,
            id_gen,
        }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Validate and launch a job.
    ///
    /// Must be called inside a tokio runtime. Errors here mean nothing was
    /// started and no notification will follow.
    pub fn dispatch(&self, request: JobRequest) -> Result<JobHandle, PreconditionError> {
        let workers = self.resolve_workers(&request)?;
        self.check_preconditions(&request.kind)?;

        let settings = self.context.settings();
        let job = Job {
            id: self.id_gen.next(),
            timeout: settings.timeouts.for_job(&request.kind, workers.len()),
            kind: request.kind,
            workers,
            destination: request.destination,
            started_at: self.clock.utc_now(),
        };

        let span = tracing::info_span!(
            "job",
            job_id = %job.id,
            kind = job.kind.name(),
            worker = job.target_id().unwrap_or("-"),
        );
        tracing::info!(parent: &span, timeout_secs = job.timeout.as_secs(), "dispatched");

        let (tx, rx) = oneshot::channel();
        let id = job.id.clone();
        let supervisor = Supervisor {
            context: Arc::clone(&self.context),
            notify: self.notify.clone(),
        };
        tokio::spawn(supervisor.run(job, tx).instrument(span));

        Ok(JobHandle { id, outcome: rx })
    }

    fn resolve_workers(
        &self,
        request: &JobRequest,
    ) -> Result<Vec<fleet_core::Worker>, PreconditionError> {
        if !request.kind.needs_worker() {
            return Ok(Vec::new());
        }
        match (&request.target, &request.kind) {
            (TargetSpec::None, _) => Err(PreconditionError::Invalid(format!(
                "{} needs a worker",
                request.kind.name()
            ))),
            (TargetSpec::AllEnabled, kind) if !matches!(kind, JobKind::SyncCredentials) => {
                Err(PreconditionError::Invalid(format!(
                    "{} runs on a single worker",
                    kind.name()
                )))
            }
            (target, _) => self.fleet.resolve(target),
        }
    }

    fn check_preconditions(&self, kind: &JobKind) -> Result<(), PreconditionError> {
        let paths = &self.context.settings().paths;
        match kind {
            JobKind::Command { command } if command.trim().is_empty() => {
                Err(PreconditionError::Invalid("command is empty".to_string()))
            }
            JobKind::MakeDir { path } if path.trim().is_empty() => {
                Err(PreconditionError::Invalid("path is empty".to_string()))
            }
            JobKind::Delete { name } if name.trim().is_empty() => {
                Err(PreconditionError::Invalid("artifact name is empty".to_string()))
            }
            JobKind::BuildImage { os_code, .. } if os_code.trim().is_empty() => {
                Err(PreconditionError::Invalid("os code is empty".to_string()))
            }
            JobKind::BuildImage { .. } => require_file(&paths.build_script_path()),
            JobKind::Install { .. } => require_file(&paths.install_script_path()),
            JobKind::Publish {
                source: PublishSource::Local { path },
            } => require_file(path),
            JobKind::Store { local_path, .. } => require_file(local_path),
            JobKind::SyncCredentials => require_file(&paths.rclone_config),
            _ => Ok(()),
        }
    }
}

fn require_file(path: &Path) -> Result<(), PreconditionError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PreconditionError::MissingFile(path.to_path_buf()))
    }
}

struct Supervisor<R, P, H, N> {
    context: Arc<JobContext<R, P, H>>,
    notify: N,
}

impl<R, P, H, N> Supervisor<R, P, H, N>
where
    R: RemoteAdapter,
    P: StoreProvider,
    H: CommandHost,
    N: NotifyAdapter,
{
    async fn run(self, job: Job, tx: oneshot::Sender<JobOutcome>) {
        let start = tokio::time::Instant::now();

        let body = {
            let context = Arc::clone(&self.context);
            let job = job.clone();
            tokio::spawn(async move { context.run(&job).await }.in_current_span())
        };
        let abort = body.abort_handle();

        let result = match tokio::time::timeout(job.timeout, body).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(JobFailure::Internal(if join_error.is_panic() {
                "job panicked".to_string()
            } else {
                join_error.to_string()
            })),
            Err(_) => {
                // The remote process may keep running; only our wait ends
                abort.abort();
                Err(JobFailure::Timeout { after: job.timeout })
            }
        };

        let outcome = JobOutcome {
            job_id: job.id.clone(),
            kind: job.kind.name(),
            worker: job.target().map(|w| w.name.clone()),
            result,
            elapsed: start.elapsed(),
        };
        let elapsed_ms = outcome.elapsed.as_millis() as u64;
        match &outcome.result {
            Ok(_) => tracing::info!(elapsed_ms, "completed"),
            Err(JobFailure::Timeout { .. }) => tracing::warn!(elapsed_ms, "timed out"),
            Err(e) => tracing::warn!(elapsed_ms, error = %e, "failed"),
        }

        let notification = Notification::new(job.destination.clone(), outcome.render());
        if let Err(e) = self.notify.notify(&notification).await {
            tracing::error!(error = %e, "failed to deliver outcome");
        }
        // The caller may have dropped the handle
        let _ = tx.send(outcome);
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
