// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn unmatched_commands_succeed_empty() {
    let host = FakeCommandHost::new();
    let out = host
        .run(&CommandSpec::new("true"), Duration::from_secs(1))
        .await
        .unwrap();
    assert!(out.success());
    assert!(out.stdout.is_empty());
    assert_eq!(host.lines(), vec!["true"]);
}

#[tokio::test]
async fn once_replies_are_consumed_before_standing_ones() {
    let host = FakeCommandHost::new();
    host.on("lsf", FakeReply::ok("standing"))
        .once("lsf", FakeReply::ok("first"));

    let spec = CommandSpec::new("rclone").arg("lsf");
    let first = host.run(&spec, Duration::from_secs(1)).await.unwrap();
    let second = host.run(&spec, Duration::from_secs(1)).await.unwrap();
    assert_eq!(first.stdout, "first");
    assert_eq!(second.stdout, "standing");
}

#[tokio::test]
async fn newest_standing_reply_wins() {
    let host = FakeCommandHost::new();
    host.on("x", FakeReply::ok("old")).on("x", FakeReply::ok("new"));
    let out = host
        .run(&CommandSpec::new("x"), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(out.stdout, "new");
}

#[tokio::test(start_paused = true)]
async fn delay_past_timeout_reports_timeout() {
    let host = FakeCommandHost::new();
    host.on("slow", FakeReply::ok("late").after(Duration::from_secs(60)));
    let err = host
        .run(&CommandSpec::new("slow"), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ExecError::Timeout {
            after: Duration::from_secs(5)
        }
    );
}
