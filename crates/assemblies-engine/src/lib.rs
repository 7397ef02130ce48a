// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Assemblies Engine
//!
//! The simulation engine of the assemblies workspace: a seeded random
//! source, the aggregate-sampling statistics behind lazy graph generation,
//! winner-take-k selection, both connectome variants, and the [`Brain`]
//! orchestrator.
//!
//! The engine is step-sequential by contract: one projection completes fully
//! (scoring, selection, edge realization, plasticity) before the next begins,
//! because round `t`'s plasticity must be visible to round `t + 1`'s scoring.
//! `&mut self` on every mutating operation enforces exactly that; the only
//! internal parallelism is a deterministic sort inside winner selection.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod brain;
pub mod connectome;
pub mod rng;
pub(crate) mod select;
pub mod stats;

// Re-export key types
pub use brain::{Brain, ConnectomeKind, Run};
pub use connectome::{Connectome, LazyRandomConnectome, NonLazyRandomConnectome};
pub use rng::RandomSource;
