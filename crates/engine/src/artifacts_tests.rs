// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fleet_adapters::FakeStoreProvider;
use fleet_core::Secret;
use std::path::PathBuf;

const GIB: u64 = 1024 * 1024 * 1024;

fn client() -> (FakeStoreProvider, ArtifactClient<FakeStoreProvider>) {
    let stores = FakeStoreProvider::new();
    let client = ArtifactClient::new(stores.clone(), StoreSettings::default());
    (stores, client)
}

fn worker() -> Worker {
    Worker {
        id: "tumbal1_10_0_0_1".to_string(),
        name: "Builder".to_string(),
        address: "10.0.0.1".to_string(),
        credential: Secret::new("p"),
        enabled: true,
    }
}

#[tokio::test]
async fn list_classifies_golden_and_filters_suffixes() {
    let (stores, client) = client();
    stores.store().put("gdrive:rdp-images/golden-win10.img.gz", 5 * GIB);
    stores.store().put("gdrive:rdp-images/win11.img", 3 * GIB);
    stores.store().put("gdrive:rdp-images/notes.txt", 10);

    let artifacts = client.list().await.unwrap();

    assert_eq!(artifacts.len(), 2);
    let golden = artifacts.iter().find(|a| a.name() == "golden-win10.img.gz").unwrap();
    assert!(golden.is_golden);
    assert_eq!(golden.size, 5 * GIB);
    let regular = artifacts.iter().find(|a| a.name() == "win11.img").unwrap();
    assert!(!regular.is_golden);
}

#[tokio::test]
async fn publish_new_artifact_copies_without_delete() {
    let (stores, client) = client();
    stores.store().add_local_file("/srv/win10.img", 42);

    let published = client
        .publish(&PublishSource::Local { path: PathBuf::from("/srv/win10.img") }, None)
        .await
        .unwrap();

    assert!(!published.replaced);
    assert_eq!(published.destination, "gdrive:rdp-images");
    assert_eq!(stores.store().operations(), vec!["local find", "local copy"]);
    assert!(stores.store().contains("gdrive:rdp-images/win10.img"));
}

#[tokio::test]
async fn publish_over_existing_name_leaves_exactly_one() {
    let (stores, client) = client();
    stores.store().put("gdrive:rdp-images/win10.img", 1);
    stores.store().add_local_file("/srv/win10.img", 42);

    let published = client
        .publish(&PublishSource::Local { path: PathBuf::from("/srv/win10.img") }, None)
        .await
        .unwrap();

    assert!(published.replaced);
    assert_eq!(
        stores.store().operations(),
        vec!["local find", "local delete", "local copy"]
    );
    let listed = client.list().await.unwrap();
    let copies: Vec<_> = listed.iter().filter(|a| a.name() == "win10.img").collect();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].size, 42);
}

#[tokio::test]
async fn publish_replaces_only_the_top_level_copy() {
    let (stores, client) = client();
    stores.store().put("gdrive:rdp-images/win10.img", 1);
    stores.store().put("gdrive:rdp-images/archive/win10.img", 7);
    stores.store().add_local_file("/srv/win10.img", 42);

    client
        .publish(&PublishSource::Local { path: PathBuf::from("/srv/win10.img") }, None)
        .await
        .unwrap();

    assert!(stores.store().contains("gdrive:rdp-images/archive/win10.img"));
    let listed = client.list().await.unwrap();
    let top: Vec<_> = listed.iter().filter(|a| a.path == "win10.img").collect();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].size, 42);
}

#[tokio::test]
async fn delete_leaves_same_name_in_subfolder() {
    let (stores, client) = client();
    stores.store().put("gdrive:rdp-images/win10.img", 1);
    stores.store().put("gdrive:rdp-images/archive/win10.img", 7);

    client.delete("win10.img").await.unwrap();

    assert!(!stores.store().contains("gdrive:rdp-images/win10.img"));
    assert!(stores.store().contains("gdrive:rdp-images/archive/win10.img"));
}

#[tokio::test]
async fn publish_from_worker_checks_remote_and_runs_there() {
    let (stores, client) = client();
    let w = worker();

    client
        .publish(&PublishSource::Worker { path: "golden-win10.img.gz".to_string() }, Some(&w))
        .await
        .unwrap();

    let calls = stores.store().calls();
    assert!(calls.iter().all(|c| c.host == w.id));
    assert_eq!(
        stores.store().operations(),
        vec![
            format!("{} listremotes", w.id),
            format!("{} mkdir", w.id),
            format!("{} find", w.id),
            format!("{} copy", w.id),
        ]
    );
    assert_eq!(calls[3].args[0], "/root/rdp-images/golden-win10.img.gz");
}

#[tokio::test]
async fn publish_from_unconfigured_worker_is_config_error() {
    let (stores, client) = client();
    stores.store().set_remotes(&["onedrive:"]);

    let err = client
        .publish(&PublishSource::Worker { path: "/root/x.img".to_string() }, Some(&worker()))
        .await
        .unwrap_err();

    assert!(matches!(err, JobFailure::Config(ref m) if m.contains("gdrive:")), "{:?}", err);
    assert_eq!(stores.store().calls().len(), 1);
}

#[tokio::test]
async fn delete_missing_artifact_is_not_found() {
    let (stores, client) = client();

    let err = client.delete("ghost.img").await.unwrap_err();

    assert_eq!(err, JobFailure::NotFound("ghost.img".to_string()));
    assert_eq!(stores.store().operations(), vec!["local find"]);
}

#[tokio::test]
async fn delete_verifies_absence() {
    let (stores, client) = client();
    stores.store().put("gdrive:rdp-images/old.img", 1);

    client.delete("old.img").await.unwrap();

    assert!(!stores.store().contains("gdrive:rdp-images/old.img"));
    assert_eq!(
        stores.store().operations(),
        vec!["local find", "local delete", "local find"]
    );
}

#[tokio::test]
async fn delete_that_leaves_the_file_is_a_mismatch() {
    let (stores, client) = client();
    stores.store().put("gdrive:rdp-images/stuck.img", 1);
    stores.store().make_sticky("gdrive:rdp-images/stuck.img");

    let err = client.delete("stuck.img").await.unwrap_err();

    assert!(matches!(err, JobFailure::VerificationMismatch(ref m) if m.contains("stuck.img")));
}

#[tokio::test]
async fn fetch_resolves_bare_paths_against_remote_root() {
    let (stores, client) = client();
    stores.store().put("gdrive:rdp-images/win10.img.gz", 3);

    client
        .fetch("rdp-images/win10.img.gz", Path::new("/tmp/dl"))
        .await
        .unwrap();

    assert_eq!(stores.store().fetched(), vec!["/tmp/dl/win10.img.gz"]);
}

#[tokio::test]
async fn fetch_keeps_explicit_remote_prefix() {
    let (stores, client) = client();
    stores.store().put("gdrive:backups/a.img", 1);

    client.fetch("gdrive:backups/a.img", Path::new("/tmp/dl")).await.unwrap();

    assert_eq!(stores.store().fetched(), vec!["/tmp/dl/a.img"]);
}

#[tokio::test]
async fn store_uploads_into_named_folder() {
    let (stores, client) = client();

    let destination = client.store(Path::new("/srv/a.img"), "backups/").await.unwrap();

    assert_eq!(destination, "gdrive:backups");
    assert!(stores.store().contains("gdrive:backups/a.img"));
}

#[test]
fn store_errors_map_onto_job_failures() {
    let connect = store_failure(StoreError::Exec(ExecError::Connect {
        address: "h".to_string(),
        reason: "refused".to_string(),
    }));
    assert!(matches!(connect, JobFailure::Connect { .. }));

    let failed = store_failure(StoreError::Failed {
        operation: "copy",
        detail: "exit 3: quota".to_string(),
    });
    assert_eq!(failed, JobFailure::Store("copy failed: exit 3: quota".to_string()));
}
