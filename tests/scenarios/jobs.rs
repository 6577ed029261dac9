// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job dispatch: outcomes, notifications, unreachable workers

use crate::prelude::*;
use fleet_adapters::{SshAdapter, SshOptions, TracedRemoteAdapter};
use fleet_core::JobFailure;

#[tokio::test]
async fn every_job_notifies_exactly_once() {
    let world = World::new();
    let up = world.fleet.add_worker("up", "10.0.0.1", Secret::new("p")).unwrap();
    let down = world.fleet.add_worker("down", "10.0.0.2", Secret::new("p")).unwrap();
    world.remote.on("10.0.0.1 echo OK", FakeReply::ok("OK\nMem: 8G\n/dev/vda1 50G"));
    world.remote.on("10.0.0.1 false", FakeReply::exit(3, "", "nope"));
    world.remote.set_unreachable("10.0.0.2");

    let requests = vec![
        JobRequest::new(JobKind::Probe, TargetSpec::Worker(up.id.clone()), "chat"),
        JobRequest::new(JobKind::Probe, TargetSpec::Worker(down.id.clone()), "chat"),
        JobRequest::new(
            JobKind::Command {
                command: "false".to_string(),
            },
            TargetSpec::Worker(up.id.clone()),
            "chat",
        ),
    ];
    let handles: Vec<_> = requests
        .into_iter()
        .map(|r| world.runner.dispatch(r).unwrap())
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.wait().await.unwrap().status());
    }
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert_eq!(
        statuses,
        vec![JobStatus::Success, JobStatus::Failure, JobStatus::Failure]
    );
    let messages = world.notify.messages();
    assert_eq!(messages.len(), 3, "{:?}", messages);
    assert_eq!(messages.iter().filter(|m| m.starts_with("✅")).count(), 1);
    assert_eq!(messages.iter().filter(|m| m.starts_with("❌")).count(), 2);
    assert!(world.notify.calls().iter().all(|n| n.destination == "chat"));
}

#[tokio::test]
async fn refused_dispatch_sends_nothing() {
    let world = World::new();

    let err = world
        .runner
        .dispatch(JobRequest::new(JobKind::Probe, TargetSpec::Active, "chat"))
        .unwrap_err();

    assert_eq!(err, fleet_engine::PreconditionError::NoActiveWorker);
    tokio::task::yield_now().await;
    assert!(world.notify.calls().is_empty());
    assert!(world.remote.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unreachable_worker_fails_at_connect_timeout() {
    let ssh_host = FakeCommandHost::new();
    ssh_host.on(
        "root@10.255.255.1",
        FakeReply::exit(
            255,
            "",
            "ssh: connect to host 10.255.255.1 port 22: Connection timed out",
        )
        .after(Duration::from_secs(10)),
    );
    let remote = TracedRemoteAdapter::new(SshAdapter::with_host(ssh_host, SshOptions::default()));
    let world = World::with_remote(remote);
    world
        .fleet
        .add_worker("dark", "10.255.255.1", Secret::new("p"))
        .unwrap();

    let start = tokio::time::Instant::now();
    let outcome = world.run(JobKind::Probe, TargetSpec::Active).await;

    assert!(
        matches!(outcome.result, Err(JobFailure::Connect { ref address, .. }) if address == "10.255.255.1"),
        "{:?}",
        outcome.result
    );
    assert!(start.elapsed() < world.settings.timeouts.probe);
    assert_eq!(world.notify.calls().len(), 1);
    assert!(world.notify.messages()[0].contains("could not reach 10.255.255.1"));
}

#[tokio::test]
async fn credential_sync_reports_each_worker_once() {
    let world = World::new();
    world
        .credentials()
        .configure("client.apps", &Secret::new("shh"))
        .unwrap();
    world.fleet.add_worker("alpha", "10.0.0.1", Secret::new("p")).unwrap();
    world.fleet.add_worker("beta", "10.0.0.2", Secret::new("p")).unwrap();
    let gamma = world.fleet.add_worker("gamma", "10.0.0.3", Secret::new("p")).unwrap();
    world.fleet.set_enabled(&gamma.id, false).unwrap();
    world.remote.on("10.0.0.1 ", FakeReply::ok("SUCCESS\n"));
    world.remote.set_unreachable("10.0.0.2");

    let outcome = world
        .run(JobKind::SyncCredentials, TargetSpec::AllEnabled)
        .await;

    assert!(matches!(
        outcome.result,
        Err(JobFailure::Partial {
            failed: 1,
            total: 2,
            ..
        })
    ));
    let message = &world.notify.messages()[0];
    assert!(message.contains("✅ alpha: synced"), "{}", message);
    assert!(message.contains("❌ beta:"), "{}", message);
    assert!(!message.contains("gamma"), "{}", message);
    assert!(!message.contains("shh"), "{}", message);
    assert_eq!(world.notify.calls().len(), 1);
}
