// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # assemblies
//!
//! Simulation core for the assembly calculus: discrete brain areas of up to
//! ~10^7 neurons, probabilistic synapses under multiplicative Hebbian
//! plasticity, and winner-take-k firing dynamics — with a lazily-sampled
//! random graph so that only observable structure is ever materialized.
//!
//! This umbrella crate re-exports the workspace members:
//! - `assemblies-structures`: identities, state containers, errors,
//!   configuration.
//! - `assemblies-engine`: the random source, both connectome variants, and
//!   the [`Brain`] orchestrator.
//!
//! ## Example
//!
//! ```
//! use assemblies::{Brain, ConnectomeKind, ConnectomeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut brain = Brain::new(
//!     ConnectomeKind::Lazy,
//!     ConnectomeConfig { p: 0.1, seed: 42, ..Default::default() },
//! )?;
//! let area = brain.add_area(1000, 50, 0.1)?;
//! let stim = brain.add_stimulus(50)?;
//!
//! // Drive the stimulus into the area until its assembly stabilizes.
//! let snapshots: Vec<_> = brain
//!     .run(20, &[stim.into()], area)
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(snapshots.last().unwrap().len(), 50);
//! # Ok(())
//! # }
//! ```

pub use assemblies_engine::{
    Brain, Connectome, ConnectomeKind, LazyRandomConnectome, NonLazyRandomConnectome,
    RandomSource, Run,
};
pub use assemblies_structures::{
    overlaps_with_base, Area, AreaId, Assembly, BrainError, ConfigLoadError, ConfigurationError,
    ConnectomeConfig, ProjectionMap, Result, SourceId, Stimulus, StimulusId, UnknownEntityError,
};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
