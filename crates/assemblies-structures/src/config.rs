// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connectome-level configuration.
//!
//! All fields have serde defaults so partial TOML files work; `validate()`
//! must pass before a connectome is constructed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Connectome-wide parameters shared by both variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectomeConfig {
    /// Edge probability: every ordered (source unit, target neuron) pair
    /// carries a synapse with this probability. Must lie in (0, 1].
    pub p: f64,
    /// Seed for the connectome-owned random source. Identical configuration
    /// and seed reproduce identical simulations.
    pub seed: u64,
    /// Weight given to an edge when it is realized as present.
    pub initial_weight: f32,
    /// Sizing knob for the lazy variant's fresh-candidate pool, as a multiple
    /// of the target's `k`. The pool is drawn from the top
    /// `pool / (n - visited)` tail of the aggregate input distribution, so
    /// the probability that a true top-k member falls below the examined tail
    /// is bounded by the quantile mass excluded; raising the factor widens
    /// the tail (tighter bound, linearly more work). Must be >= 1.
    pub fresh_candidate_factor: f64,
    /// Deterministic fallback for a projection into an area that has never
    /// fired when the round carries no active input: fire the `k`
    /// lowest-indexed neurons instead of failing.
    pub silent_bootstrap: bool,
}

impl Default for ConnectomeConfig {
    fn default() -> Self {
        Self {
            p: 0.05,
            seed: 0,
            initial_weight: 1.0,
            fresh_candidate_factor: 1.0,
            silent_bootstrap: false,
        }
    }
}

impl ConnectomeConfig {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.p.is_finite() || self.p <= 0.0 || self.p > 1.0 {
            return Err(ConfigurationError::InvalidEdgeProbability { p: self.p });
        }
        if !self.initial_weight.is_finite() || self.initial_weight <= 0.0 {
            return Err(ConfigurationError::InvalidInitialWeight {
                weight: self.initial_weight,
            });
        }
        if !self.fresh_candidate_factor.is_finite() || self.fresh_candidate_factor < 1.0 {
            return Err(ConfigurationError::InvalidFreshCandidateFactor {
                factor: self.fresh_candidate_factor,
            });
        }
        Ok(())
    }

    /// Parse from a TOML string. Missing fields take their defaults; the
    /// result is validated.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Failures while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigurationError),
}
