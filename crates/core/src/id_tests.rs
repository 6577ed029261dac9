// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn uuid_gen_creates_unique_prefixed_ids() {
    let id_gen = UuidIdGen;
    let id1 = id_gen.next();
    let id2 = id_gen.next();
    assert_ne!(id1, id2);
    assert!(id1.starts_with("job-"));
    assert_eq!(id1.len(), 16);
}

#[test]
fn sequential_gen_is_shared_across_clones() {
    let id_gen1 = SequentialIdGen::new("shared");
    let id_gen2 = id_gen1.clone();
    assert_eq!(id_gen1.next(), "shared-1");
    assert_eq!(id_gen2.next(), "shared-2");
    assert_eq!(id_gen1.next(), "shared-3");
}

#[parameterized(
    ipv4 = { 1, "1.2.3.4", "tumbal1_1_2_3_4" },
    hostname = { 3, "host-a.example", "tumbal3_host_a_example" },
    plain = { 12, "builder", "tumbal12_builder" },
)]
fn worker_id_replaces_separators(sequence: usize, address: &str, expected: &str) {
    assert_eq!(worker_id(sequence, address), expected);
}
