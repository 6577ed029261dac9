// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_notify_records_calls() {
    let adapter = FakeNotifyAdapter::new();

    adapter
        .notify(&Notification::new("owner", "Build started"))
        .await
        .unwrap();
    adapter
        .notify(&Notification::new("owner", "Build complete").with_attachment("/tmp/build.log"))
        .await
        .unwrap();

    let calls = adapter.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].destination, "owner");
    assert_eq!(calls[1].attachments.len(), 1);
    assert_eq!(adapter.messages(), vec!["Build started", "Build complete"]);
}

#[tokio::test]
async fn wait_for_returns_once_enough_arrive() {
    let adapter = FakeNotifyAdapter::new();
    let sender = adapter.clone();
    tokio::spawn(async move {
        sender.notify(&Notification::new("d", "late")).await.unwrap();
    });

    let calls = adapter.wait_for(1).await;
    assert_eq!(calls[0].message, "late");
}
