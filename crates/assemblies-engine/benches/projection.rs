// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Projection hot-path benchmarks: lazy vs non-lazy at a population where
//! both run, plus the lazy variant at a population only it can handle.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use assemblies_engine::{Brain, ConnectomeKind};
use assemblies_structures::{AreaId, ConnectomeConfig, SourceId};

fn config(seed: u64) -> ConnectomeConfig {
    ConnectomeConfig {
        p: 0.05,
        seed,
        ..ConnectomeConfig::default()
    }
}

fn prepared_brain(kind: ConnectomeKind, n: u32, k: u32) -> (Brain, Vec<SourceId>, AreaId) {
    let mut brain = Brain::new(kind, config(42)).unwrap();
    let area = brain.add_area(n, k, 0.1).unwrap();
    let stim = brain.add_stimulus(k).unwrap();
    let sources = vec![SourceId::from(stim)];
    // Warm round so later rounds exercise the support-scoring path too.
    brain.project(&sources, area).unwrap();
    (brain, sources, area)
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");

    for (name, kind, n, k) in [
        ("nonlazy_n2k_k50", ConnectomeKind::NonLazy, 2000u32, 50u32),
        ("lazy_n2k_k50", ConnectomeKind::Lazy, 2000, 50),
        ("lazy_n1m_k1000", ConnectomeKind::Lazy, 1_000_000, 1000),
    ] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || prepared_brain(kind, n, k),
                |(mut brain, sources, area)| brain.project(&sources, area).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);
