// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::exec::FakeReply;

fn worker(address: &str) -> Worker {
    Worker {
        id: "tumbal1_x".to_string(),
        name: "W1".to_string(),
        address: address.to_string(),
        credential: Secret::new("pw"),
        enabled: true,
    }
}

#[tokio::test]
async fn worker_host_runs_quoted_command_on_worker() {
    let remote = FakeRemoteAdapter::new();
    let host = WorkerHost::new(remote.clone(), &worker("1.2.3.4"));

    let spec = CommandSpec::new("rclone").args(["lsf", "gdrive:rdp-images/", "--include", "a b.img"]);
    host.run(&spec, Duration::from_secs(30)).await.unwrap();

    assert_eq!(
        remote.calls(),
        vec![RemoteCall::Execute {
            address: "1.2.3.4".to_string(),
            command: "rclone lsf gdrive:rdp-images/ --include 'a b.img'".to_string(),
            timeout: Duration::from_secs(30),
        }]
    );
}

#[tokio::test]
async fn fake_remote_scripts_by_address_and_command() {
    let remote = FakeRemoteAdapter::new();
    remote
        .on("1.1.1.1 echo", FakeReply::ok("one"))
        .on("2.2.2.2 echo", FakeReply::ok("two"));

    let cred = Secret::new("p");
    let a = remote
        .execute("1.1.1.1", &cred, "echo hi", Duration::from_secs(1))
        .await
        .unwrap();
    let b = remote
        .execute("2.2.2.2", &cred, "echo hi", Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(a.stdout, "one");
    assert_eq!(b.stdout, "two");
}

#[tokio::test]
async fn fake_remote_unreachable_hosts_fail_to_connect() {
    let remote = FakeRemoteAdapter::new();
    remote.set_unreachable("9.9.9.9");
    let err = remote
        .execute("9.9.9.9", &Secret::new("p"), "true", Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Connect { .. }));
    assert_eq!(remote.calls().len(), 1);
}
