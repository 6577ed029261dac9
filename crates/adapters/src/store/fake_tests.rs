// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn list_strips_collection_prefix() {
    let store = FakeObjectStore::new();
    store.put("gdrive:rdp-images/win11.img", 3);
    store.put("gdrive:other/x.img", 1);

    let entries = store.list("gdrive:rdp-images").await.unwrap();
    assert_eq!(
        entries,
        vec![StoreEntry::new("win11.img", 3)]
    );
}

#[tokio::test]
async fn delete_and_find_only_touch_the_top_level() {
    let store = FakeObjectStore::new();
    store.put("gdrive:rdp-images/win10.img", 1);
    store.put("gdrive:rdp-images/archive/win10.img", 2);

    store.delete_matching("gdrive:rdp-images", "win10.img").await.unwrap();

    assert!(!store.contains("gdrive:rdp-images/win10.img"));
    assert!(store.contains("gdrive:rdp-images/archive/win10.img"));
    assert!(store.find("gdrive:rdp-images", "win10.img").await.unwrap().is_empty());
}

#[tokio::test]
async fn sticky_delete_reports_success_but_keeps_object() {
    let store = FakeObjectStore::new();
    store.put("gdrive:rdp-images/a.img", 1);
    store.make_sticky("gdrive:rdp-images/a.img");

    store.delete_matching("gdrive:rdp-images", "a.img").await.unwrap();
    assert!(store.contains("gdrive:rdp-images/a.img"));
}

#[tokio::test]
async fn upload_records_object_with_local_size() {
    let store = FakeObjectStore::new();
    store.add_local_file("/root/rdp-images/golden-win10.img.gz", 42);

    store
        .copy("/root/rdp-images/golden-win10.img.gz", "gdrive:rdp-images/")
        .await
        .unwrap();

    assert!(store.contains("gdrive:rdp-images/golden-win10.img.gz"));
}

#[tokio::test]
async fn fetch_of_missing_object_fails() {
    let store = FakeObjectStore::new();
    let err = store
        .copy("gdrive:rdp-images/nope.img", "/tmp")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Failed { operation: "copy", .. }));
}

#[tokio::test]
async fn provider_handles_share_state_and_tag_hosts() {
    let provider = FakeStoreProvider::new();
    let worker = Worker {
        id: "tumbal1_x".to_string(),
        name: "W".to_string(),
        address: "x".to_string(),
        credential: fleet_core::Secret::new("p"),
        enabled: true,
    };
    provider.on_worker(&worker).mkdir("gdrive:rdp-images").await.unwrap();
    provider.local().check("gdrive").await.unwrap();

    assert_eq!(
        provider.store().operations(),
        vec!["tumbal1_x mkdir", "local check"]
    );
}

#[tokio::test]
async fn failing_operation_is_recorded_then_errors() {
    let store = FakeObjectStore::new();
    store.fail("check", "token expired");
    let err = store.check("gdrive").await.unwrap_err();
    assert_eq!(err.to_string(), "check failed: token expired");
    assert_eq!(store.calls().len(), 1);
}
