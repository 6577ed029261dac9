// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact store client
//!
//! Every call queries the store live. Publish runs find, delete, copy in
//! that order; a concurrent publisher of the same name can interleave.

use fleet_adapters::{ExecError, ObjectStoreAdapter, StoreError, StoreProvider};
use fleet_core::config::StoreSettings;
use fleet_core::{Artifact, JobFailure, PublishSource, Worker};
use std::path::Path;

/// Result of a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub name: String,
    /// Collection the artifact landed in
    pub destination: String,
    /// A same-named artifact was deleted first
    pub replaced: bool,
}

/// Lists, publishes, fetches and deletes artifacts
#[derive(Clone)]
pub struct ArtifactClient<P> {
    stores: P,
    settings: StoreSettings,
}

impl<P: StoreProvider> ArtifactClient<P> {
    pub fn new(stores: P, settings: StoreSettings) -> Self {
        Self { stores, settings }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Recursive listing of the collection, filtered and classified
    pub async fn list(&self) -> Result<Vec<Artifact>, JobFailure> {
        let entries = self
            .stores
            .local()
            .list(&self.settings.collection_path())
            .await
            .map_err(store_failure)?;
        Ok(self.settings.filter().select(&entries))
    }

    /// Copy `source` into the collection, replacing a same-named artifact.
    ///
    /// Worker sources run the store commands on `worker`.
    pub async fn publish(
        &self,
        source: &PublishSource,
        worker: Option<&Worker>,
    ) -> Result<Published, JobFailure> {
        let name = source.artifact_name();
        if name.is_empty() {
            return Err(JobFailure::Config("artifact source has no file name".to_string()));
        }
        let collection = self.settings.collection_path();

        let (store, source_path) = match (source, worker) {
            (PublishSource::Local { path }, _) => {
                (self.stores.local(), path.to_string_lossy().into_owned())
            }
            (PublishSource::Worker { path }, Some(worker)) => {
                let store = self.stores.on_worker(worker);
                self.prepare_worker(&store, &worker.name).await?;
                (store, self.worker_path(path))
            }
            (PublishSource::Worker { .. }, None) => {
                return Err(JobFailure::Internal("worker source without a worker".to_string()));
            }
        };

        let existing = store.find(&collection, &name).await.map_err(store_failure)?;
        let replaced = !existing.is_empty();
        if replaced {
            tracing::info!(name = %name, "replacing existing artifact");
            store
                .delete_matching(&collection, &name)
                .await
                .map_err(store_failure)?;
        }
        store
            .copy(&source_path, &collection)
            .await
            .map_err(store_failure)?;

        Ok(Published {
            name,
            destination: collection,
            replaced,
        })
    }

    /// The remote must be configured on the worker and the collection present
    async fn prepare_worker(
        &self,
        store: &P::Store,
        worker_name: &str,
    ) -> Result<(), JobFailure> {
        let wanted = format!("{}:", self.settings.remote);
        let remotes = store.list_remotes().await.map_err(store_failure)?;
        if !remotes.iter().any(|r| r.trim() == wanted) {
            return Err(JobFailure::Config(format!(
                "remote {} is not configured on {}; sync credentials first",
                wanted, worker_name
            )));
        }
        store
            .mkdir(&self.settings.collection_path())
            .await
            .map_err(store_failure)
    }

    /// Bare file names live in the worker's image folder
    fn worker_path(&self, path: &str) -> String {
        if path.contains('/') {
            path.to_string()
        } else {
            fleet_adapters::store::join(&self.settings.worker_images_dir, path)
        }
    }

    /// Delete `name` from the collection, then confirm it is gone
    pub async fn delete(&self, name: &str) -> Result<(), JobFailure> {
        let store = self.stores.local();
        let collection = self.settings.collection_path();

        if store.find(&collection, name).await.map_err(store_failure)?.is_empty() {
            return Err(JobFailure::NotFound(name.to_string()));
        }
        store
            .delete_matching(&collection, name)
            .await
            .map_err(store_failure)?;
        if !store.find(&collection, name).await.map_err(store_failure)?.is_empty() {
            return Err(JobFailure::VerificationMismatch(format!(
                "{} is still present",
                name
            )));
        }
        Ok(())
    }

    /// Download `remote_path` into the local directory `destination`.
    ///
    /// A path without a remote prefix is taken from the remote root, as in `store`.
    pub async fn fetch(&self, remote_path: &str, destination: &Path) -> Result<(), JobFailure> {
        let source = if remote_path.contains(':') {
            remote_path.to_string()
        } else {
            format!("{}:{}", self.settings.remote, remote_path.trim_start_matches('/'))
        };
        self.stores
            .local()
            .copy(&source, &destination.to_string_lossy())
            .await
            .map_err(store_failure)
    }

    /// Upload a local file into `folder` on the remote, no dedup.
    ///
    /// An empty folder means the collection.
    pub async fn store(&self, local_path: &Path, folder: &str) -> Result<String, JobFailure> {
        let folder = folder.trim_matches('/');
        let destination = if folder.is_empty() {
            self.settings.collection_path()
        } else {
            format!("{}:{}", self.settings.remote, folder)
        };
        self.stores
            .local()
            .copy(&local_path.to_string_lossy(), &destination)
            .await
            .map_err(store_failure)?;
        Ok(destination)
    }
}

/// Map a store error onto the job failure taxonomy
pub fn store_failure(error: StoreError) -> JobFailure {
    match error {
        StoreError::Exec(ExecError::Connect { address, reason }) => {
            JobFailure::Connect { address, reason }
        }
        StoreError::Exec(ExecError::Timeout { after }) => JobFailure::Timeout { after },
        other => JobFailure::Store(other.to_string()),
    }
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
