// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact listing and publishing through dispatched jobs

use crate::prelude::*;
use fleet_core::PublishSource;
use fleet_engine::ArtifactClient;

#[tokio::test]
async fn listing_puts_golden_first_and_skips_other_files() {
    let world = World::new();
    let store = world.stores.store();
    store.put("gdrive:rdp-images/win11.img", 3 * GIB);
    store.put("gdrive:rdp-images/golden-win10.img.gz", 5 * GIB);
    store.put("gdrive:rdp-images/notes.txt", 10);

    let outcome = world.run(JobKind::ListArtifacts, TargetSpec::None).await;

    let report = outcome.result.unwrap();
    assert!(report.message.starts_with("2 artifacts in"), "{}", report.message);
    assert!(report.message.ends_with("(1 golden)"), "{}", report.message);
    let output = report.output.unwrap();
    let golden = output.find("⭐ golden-win10.img.gz (5.0 GB)").unwrap();
    let regular = output.find("💿 win11.img (3.0 GB)").unwrap();
    assert!(golden < regular, "{}", output);
    assert!(!output.contains("notes.txt"));
}

#[tokio::test]
async fn republishing_a_name_leaves_exactly_one_copy() {
    let world = World::new();
    let image = world.dir.path().join("golden-win10.img.gz");
    std::fs::write(&image, b"new image").unwrap();
    let store = world.stores.store();
    store.add_local_file(image.to_string_lossy(), 9);
    store.put("gdrive:rdp-images/golden-win10.img.gz", 5 * GIB);

    let outcome = world
        .run(
            JobKind::Publish {
                source: PublishSource::Local { path: image },
            },
            TargetSpec::None,
        )
        .await;
    assert_eq!(outcome.status(), JobStatus::Success, "{}", outcome.render());
    assert!(outcome.render().contains("replaced existing copy"));

    let client = ArtifactClient::new(world.stores.clone(), world.settings.store.clone());
    let copies: Vec<_> = client
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.name() == "golden-win10.img.gz")
        .collect();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].size, 9);
}

#[tokio::test]
async fn deleting_a_missing_artifact_is_not_found() {
    let world = World::new();

    let outcome = world
        .run(
            JobKind::Delete {
                name: "ghost.img".to_string(),
            },
            TargetSpec::None,
        )
        .await;

    assert_eq!(outcome.status(), JobStatus::Failure);
    assert!(outcome.render().contains("not found: ghost.img"), "{}", outcome.render());
    assert_eq!(world.notify.calls().len(), 1);
}
