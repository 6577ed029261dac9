// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::exec::{FakeCommandHost, FakeReply};
use crate::remote::{FakeRemoteAdapter, RemoteCall};
use fleet_core::Secret;

fn store() -> (RcloneStore<FakeCommandHost>, FakeCommandHost) {
    let host = FakeCommandHost::new();
    (RcloneStore::new(host.clone(), StoreTimeouts::default()), host)
}

#[tokio::test]
async fn list_uses_time_size_path_format_and_parses_entries() {
    let (store, host) = store();
    host.on(
        "rclone lsf",
        FakeReply::ok(
            "2026-03-01 12:00:00;5368709120;golden-win10.img.gz\n\
             2026-02-01 09:00:00;3221225472;win11.img\n\
             2026-01-01 00:00:00;12;notes.txt\n",
        ),
    );

    let entries = store.list("gdrive:rdp-images").await.unwrap();

    assert_eq!(
        host.lines(),
        vec!["rclone lsf gdrive:rdp-images/ --recursive --files-only --format tsp"]
    );
    assert_eq!(host.calls()[0].timeout, Duration::from_secs(45));
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].path, "golden-win10.img.gz");
    assert_eq!(entries[0].size, 5_368_709_120);
    assert!(entries[0].modified_at.is_some());
}

#[tokio::test]
async fn find_filters_to_exact_name() {
    let (store, host) = store();
    host.on("rclone lsf", FakeReply::ok("a[1].img\n"));

    let found = store.find("gdrive:rdp-images", "a[1].img").await.unwrap();

    assert_eq!(found, vec!["a[1].img".to_string()]);
    assert_eq!(
        host.lines(),
        vec![r"rclone lsf gdrive:rdp-images/ --files-only --include /a\[1\].img"]
    );
}

#[tokio::test]
async fn delete_anchors_filter_to_collection_root() {
    let (store, host) = store();
    store
        .delete_matching("gdrive:rdp-images", "win11.img")
        .await
        .unwrap();

    let call = &host.calls()[0];
    assert_eq!(
        call.line(),
        "rclone delete gdrive:rdp-images/ --include /win11.img -v"
    );
    assert_eq!(call.timeout, Duration::from_secs(120));
}

#[tokio::test]
async fn nonzero_exit_is_failed_with_stderr() {
    let (store, host) = store();
    host.on(
        "rclone copy",
        FakeReply::exit(3, "", "directory not found"),
    );

    let err = store
        .copy("/tmp/x.img", "gdrive:rdp-images/")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::Failed {
            operation: "copy",
            detail: "exit 3: directory not found".to_string(),
        }
    );
    assert_eq!(host.calls()[0].timeout, Duration::from_secs(7200));
}

#[tokio::test]
async fn check_lists_remote_root() {
    let (store, host) = store();
    store.check("gdrive").await.unwrap();
    assert_eq!(host.lines(), vec!["rclone lsd gdrive:"]);
}

#[tokio::test]
async fn list_remotes_returns_trimmed_lines() {
    let (store, host) = store();
    host.on("listremotes", FakeReply::ok("gdrive:\n\n  backup:  \n"));
    let remotes = store.list_remotes().await.unwrap();
    assert_eq!(remotes, vec!["gdrive:".to_string(), "backup:".to_string()]);
}

#[tokio::test]
async fn explicit_config_precedes_subcommand() {
    let host = FakeCommandHost::new();
    let store = RcloneStore::new(host.clone(), StoreTimeouts::default())
        .with_config("/srv/bot/rclone.conf");
    store.mkdir("gdrive:rdp-images").await.unwrap();
    assert_eq!(
        host.lines(),
        vec!["rclone --config /srv/bot/rclone.conf mkdir gdrive:rdp-images"]
    );
}

#[tokio::test]
async fn provider_runs_worker_stores_over_remote_channel() {
    let remote = FakeRemoteAdapter::new();
    remote.on("rclone lsf", FakeReply::ok("10;a.img\n"));
    let provider = RcloneProvider::new(remote.clone(), StoreTimeouts::default());
    let worker = Worker {
        id: "tumbal1_1_2_3_4".to_string(),
        name: "W1".to_string(),
        address: "1.2.3.4".to_string(),
        credential: Secret::new("pw"),
        enabled: true,
    };

    let entries = provider
        .on_worker(&worker)
        .list("gdrive:rdp-images")
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert!(matches!(
        &remote.calls()[0],
        RemoteCall::Execute { address, command, .. }
            if address == "1.2.3.4"
                && command == "rclone lsf gdrive:rdp-images/ --recursive --files-only --format tsp"
    ));
}
