// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios: assembly formation and convergence, multi-target
//! rounds with double-buffered commits, and snapshot decoupling.

use assemblies::{
    overlaps_with_base, Assembly, Brain, ConnectomeConfig, ConnectomeKind, ProjectionMap, Result,
};

#[test]
fn repeated_stimulation_converges_to_a_stable_assembly() {
    // RUST_LOG=assemblies_engine=debug surfaces per-round scoring summaries.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let mut brain = Brain::new(
        ConnectomeKind::Lazy,
        ConnectomeConfig {
            p: 0.1,
            seed: 42,
            ..ConnectomeConfig::default()
        },
    )
    .unwrap();
    let area = brain.add_area(1000, 50, 0.1).unwrap();
    let stim = brain.add_stimulus(50).unwrap();

    let snapshots: Vec<Assembly> = brain
        .run(20, &[stim.into()], area)
        .collect::<Result<_>>()
        .unwrap();

    // Convergence before the round limit: the sequence ends at the first
    // repeated winner set, not at round 20.
    assert!(
        snapshots.len() < 20,
        "expected convergence before round 20, ran {}",
        snapshots.len()
    );
    let last = &snapshots[snapshots.len() - 1];
    let previous = &snapshots[snapshots.len() - 2];
    assert_eq!(last.winners, previous.winners);
    assert_eq!(last.len(), 50);
    assert!(last.winners.iter().all(|&v| v < 1000));
    assert_eq!(last.overlap(previous), 50);

    // Overlap with the converged assembly grows over the run.
    let overlaps = overlaps_with_base(&snapshots, snapshots.len() - 1);
    assert_eq!(*overlaps.last().unwrap(), 50);
    assert!(overlaps[0] <= overlaps[overlaps.len() - 2]);
}

#[test]
fn multi_target_rounds_use_preround_winners() {
    // With p = 1 every edge exists at weight 1, so winner selection is fully
    // determined by the weights we plant; plasticity is frozen to keep them.
    let mut brain = Brain::new(
        ConnectomeKind::NonLazy,
        ConnectomeConfig {
            p: 1.0,
            seed: 0,
            ..ConnectomeConfig::default()
        },
    )
    .unwrap();
    let a = brain.add_area(4, 1, 0.1).unwrap();
    let b = brain.add_area(4, 1, 0.1).unwrap();
    let stim = brain.add_stimulus(1).unwrap();
    brain.set_plasticity_enabled(false);

    let mut bootstrap = ProjectionMap::new();
    bootstrap.add(stim, a).add(stim, b);
    let winners = brain.project_round(&bootstrap).unwrap();
    assert_eq!(winners[&a], vec![0], "uniform inputs tie to lowest index");
    assert_eq!(winners[&b], vec![0]);

    // Plant weights so each area's next winner is decided by the OTHER
    // area's current (pre-round) winner.
    brain.set_weight(a.into(), 0, b, 2, 10.0).unwrap();
    brain.set_weight(b.into(), 0, a, 3, 10.0).unwrap();
    // Decoys on the neurons that would win if commits interleaved.
    brain.set_weight(a.into(), 3, b, 1, 5.0).unwrap();

    let mut cross = ProjectionMap::new();
    cross.add(a, b).add(b, a);
    let winners = brain.project_round(&cross).unwrap();

    // Target `a` commits first (lower id); a leaked commit would make `b`
    // score against a.winners == [3] and pick neuron 1 via the decoy.
    assert_eq!(winners[&a], vec![3]);
    assert_eq!(winners[&b], vec![2]);
    assert_eq!(brain.area(a).unwrap().winners(), &[3]);
    assert_eq!(brain.area(b).unwrap().winners(), &[2]);
}

#[test]
fn assemblies_are_decoupled_snapshots() {
    let mut brain = Brain::new(
        ConnectomeKind::Lazy,
        ConnectomeConfig {
            p: 0.2,
            seed: 5,
            ..ConnectomeConfig::default()
        },
    )
    .unwrap();
    let area = brain.add_area(200, 10, 0.1).unwrap();
    let stim = brain.add_stimulus(12).unwrap();

    brain.project(&[stim.into()], area).unwrap();
    let snapshot = brain.assembly(area).unwrap();
    assert_eq!(snapshot.generation, 1);

    brain.project(&[stim.into()], area).unwrap();
    let later = brain.assembly(area).unwrap();
    assert_eq!(later.generation, 2);

    // The old snapshot is immune to the mutation.
    assert_eq!(snapshot.generation, 1);
    assert_eq!(snapshot.len(), 10);
    assert_eq!(later.len(), 10);
}

#[test]
fn areas_can_project_into_themselves() {
    let mut brain = Brain::new(
        ConnectomeKind::Lazy,
        ConnectomeConfig {
            p: 0.1,
            seed: 13,
            ..ConnectomeConfig::default()
        },
    )
    .unwrap();
    let area = brain.add_area(500, 25, 0.2).unwrap();
    let stim = brain.add_stimulus(30).unwrap();

    brain.project(&[stim.into()], area).unwrap();
    // Recurrent strengthening: stimulus plus the area's own assembly.
    for _ in 0..5 {
        let winners = brain.project(&[stim.into(), area.into()], area).unwrap();
        assert_eq!(winners.len(), 25);
    }
}
