// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the simulation core.
//!
//! Key semantics:
//! - [`ConfigurationError`]: invalid parameters at construction/registration.
//!   Raised immediately, never recovered internally.
//! - [`UnknownEntityError`]: an operation referenced an unregistered id or an
//!   out-of-range unit/neuron index. Fatal to the call, recoverable by the
//!   caller.
//! - [`BrainError::InsufficientActivation`]: a projection target has never
//!   fired, the round carries zero active input, and no deterministic
//!   fallback is configured. The round does not silently proceed.
//! - [`BrainError::SamplingConsistency`]: internal invariant violation in the
//!   lazy sampler. Must never occur; if it does, it is a bug, not a
//!   recoverable condition.
//!
//! Failed calls leave connectome and area state unchanged: validation runs
//! before any mutation, and there are no automatic retries.

use crate::ids::{AreaId, SourceId, StimulusId};

/// Invalid construction/registration parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("area population n must be positive")]
    EmptyPopulation,

    #[error("firing-set size k must be positive")]
    EmptyFiringSet,

    #[error("firing-set size k={k} exceeds population n={n}")]
    FiringSetExceedsPopulation { k: u32, n: u32 },

    #[error("plasticity rate beta must be finite and non-negative, got {beta}")]
    InvalidPlasticityRate { beta: f32 },

    #[error("stimulus size must be positive")]
    EmptyStimulus,

    #[error("edge probability p must lie in (0, 1], got {p}")]
    InvalidEdgeProbability { p: f64 },

    #[error("initial edge weight must be finite and positive, got {weight}")]
    InvalidInitialWeight { weight: f32 },

    #[error("fresh candidate factor must be finite and >= 1, got {factor}")]
    InvalidFreshCandidateFactor { factor: f64 },

    #[error("edge weight must be finite and non-negative, got {weight}")]
    InvalidWeight { weight: f32 },
}

/// An operation referenced an entity the connectome does not know.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnknownEntityError {
    #[error("unknown {0}")]
    Area(AreaId),

    #[error("unknown {0}")]
    Stimulus(StimulusId),

    #[error("unit {unit} out of range for {src} (size {size})")]
    UnitOutOfRange { src: SourceId, unit: u32, size: u32 },

    #[error("neuron {neuron} out of range for {area} (population {n})")]
    NeuronOutOfRange { area: AreaId, neuron: u32, n: u32 },
}

/// Top-level error for all connectome and brain operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BrainError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    UnknownEntity(#[from] UnknownEntityError),

    #[error("{area} has never fired, the round has no active input, and no silent-bootstrap fallback is configured")]
    InsufficientActivation { area: AreaId },

    #[error("sampling consistency violation ({context}): {detail}")]
    SamplingConsistency { context: &'static str, detail: String },
}

pub type Result<T> = core::result::Result<T, BrainError>;
