// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device authorization feeding the credential sync

use crate::prelude::*;
use fleet_core::{DeviceCode, FlowState, PollResponse, TokenGrant};
use fleet_engine::DeviceAuthFlow;

fn device_code() -> DeviceCode {
    DeviceCode {
        device_code: Secret::new("dev-code"),
        user_code: "WXYZ-1234".to_string(),
        verification_url: "https://www.google.com/device".to_string(),
        interval: Duration::from_secs(5),
        expires_in: Duration::from_secs(1800),
    }
}

fn grant() -> TokenGrant {
    TokenGrant {
        access_token: Secret::new("ya29.scenario"),
        refresh_token: Secret::new("1//scenario"),
        expires_in: Some(3599),
    }
}

fn flow<R: RemoteAdapter>(
    world: &World<R>,
    server: &FakeAuthServer,
) -> DeviceAuthFlow<FakeAuthServer, FakeStoreProvider, FakeNotifyAdapter, FakeClock> {
    DeviceAuthFlow::new(
        server.clone(),
        world.stores.clone(),
        world.notify.clone(),
        world.clock.clone(),
        world.credentials(),
        world.settings.auth.scope.clone(),
    )
}

#[tokio::test]
async fn authorized_token_reaches_workers_on_sync() {
    let world = World::new();
    world
        .credentials()
        .configure("client.apps", &Secret::new("shh"))
        .unwrap();
    let server = FakeAuthServer::new();
    server.issue(device_code());
    server.reply(PollResponse::Pending);
    server.reply(PollResponse::SlowDown);
    server.reply(PollResponse::Pending);
    server.reply(PollResponse::Token(grant()));

    let outcome = flow(&world, &server).run("owner").await;

    assert_eq!(outcome.state, FlowState::Authorized);
    assert_eq!(server.poll_count(), 4);
    let sleeps = world.clock.sleeps();
    assert_eq!(sleeps.len(), 3);
    assert!(sleeps.windows(2).all(|w| w[0] <= w[1]), "{:?}", sleeps);

    let stored = world.credentials().load().unwrap();
    assert_eq!(stored.client_id, "client.apps");
    let token = stored.token.unwrap();
    assert_eq!(token.access_token.expose(), "ya29.scenario");
    assert_eq!(token.refresh_token.expose(), "1//scenario");

    world
        .fleet
        .add_worker("alpha", "10.0.0.1", Secret::new("p"))
        .unwrap();
    world.remote.on("10.0.0.1 ", FakeReply::ok("SUCCESS\n"));
    let sync = world
        .run(JobKind::SyncCredentials, TargetSpec::AllEnabled)
        .await;

    assert_eq!(sync.status(), JobStatus::Success, "{}", sync.render());
    let pushed = world.remote.commands();
    assert_eq!(pushed.len(), 1);
    assert!(pushed[0].contains("ya29.scenario"));
    assert!(pushed[0].contains("[gdrive]"));
}

#[tokio::test]
async fn reconfiguring_the_client_drops_the_token() {
    let world = World::new();
    let credentials = world.credentials();
    credentials.configure("old.apps", &Secret::new("a")).unwrap();
    let server = FakeAuthServer::new();
    server.issue(device_code());
    server.reply(PollResponse::Token(grant()));
    assert_eq!(
        flow(&world, &server).run("owner").await.state,
        FlowState::Authorized
    );

    credentials.configure("new.apps", &Secret::new("b")).unwrap();

    let stored = credentials.load().unwrap();
    assert_eq!(stored.client_id, "new.apps");
    assert!(stored.token.is_none());
    assert!(!stored.is_authorized());
}

#[tokio::test]
async fn denied_authorization_keeps_the_file_unauthorized() {
    let world = World::new();
    world
        .credentials()
        .configure("client.apps", &Secret::new("shh"))
        .unwrap();
    let server = FakeAuthServer::new();
    server.issue(device_code());
    server.reply(PollResponse::Pending);
    server.reply(PollResponse::Denied);

    let outcome = flow(&world, &server).run("owner").await;

    assert_eq!(outcome.state, FlowState::Denied);
    assert_eq!(outcome.polls, 2);
    assert!(!world.credentials().load().unwrap().is_authorized());
    let last = world.notify.messages().pop().unwrap();
    assert!(last.contains("Start the flow again"), "{}", last);
}
