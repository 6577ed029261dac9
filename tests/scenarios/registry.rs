// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry mutations as seen by a later process

use crate::prelude::*;
use fleet_engine::EngineError;
use fleet_core::{RegistryError, WorkerField};

#[test]
fn first_worker_stays_active_until_removed() {
    let world = World::new();
    let w1 = world.fleet.add_worker("W1", "1.2.3.4", Secret::new("p")).unwrap();
    assert_eq!(world.fleet.active().unwrap().id, w1.id);

    let w2 = world.fleet.add_worker("W2", "5.6.7.8", Secret::new("p")).unwrap();
    assert_eq!(world.fleet.active().unwrap().id, w1.id);

    world.fleet.remove_worker(&w1.id).unwrap();
    assert_eq!(world.fleet.active().unwrap().id, w2.id);

    let reopened = world.reopen();
    assert_eq!(reopened.active().unwrap().id, w2.id);
    assert_eq!(reopened.workers(), vec![w2]);
}

#[test]
fn conflicting_address_leaves_memory_and_disk_unchanged() {
    let world = World::new();
    let w1 = world.fleet.add_worker("W1", "1.2.3.4", Secret::new("p")).unwrap();
    world.fleet.set_enabled(&w1.id, false).unwrap();
    let before = std::fs::read_to_string(&world.settings.paths.state_file).unwrap();

    let err = world
        .fleet
        .add_worker("again", "1.2.3.4", Secret::new("q"))
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Registry(RegistryError::Conflict { ref existing, .. }) if *existing == w1.id
    ));
    assert_eq!(world.fleet.workers().len(), 1);
    assert_eq!(
        std::fs::read_to_string(&world.settings.paths.state_file).unwrap(),
        before
    );
}

#[test]
fn removing_last_enabled_worker_clears_active() {
    let world = World::new();
    let w1 = world.fleet.add_worker("W1", "1.2.3.4", Secret::new("p")).unwrap();
    let w2 = world.fleet.add_worker("W2", "5.6.7.8", Secret::new("p")).unwrap();
    world.fleet.set_enabled(&w2.id, false).unwrap();

    world.fleet.remove_worker(&w1.id).unwrap();

    assert!(world.fleet.active().is_none());
    assert!(world.reopen().active().is_none());
}

#[test]
fn owner_fields_survive_registry_edits() {
    let world = World::new();
    let w1 = world.fleet.add_worker("W1", "1.2.3.4", Secret::new("p")).unwrap();
    world
        .fleet
        .update_worker(&w1.id, WorkerField::Name, "renamed")
        .unwrap();

    let snapshot = world.reopen().snapshot();
    assert_eq!(snapshot.allowed_users, vec![42]);
    assert_eq!(snapshot.registry.get(&w1.id).unwrap().name, "renamed");
}
