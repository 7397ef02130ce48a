// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-area simulation state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::ids::AreaId;

/// A population of `n` neurons with a target firing-set size `k` and a
/// plasticity rate `beta`.
///
/// An area is a state container: it is registered with a connectome before
/// first use and mutated only by that connectome during projection. After the
/// first committed projection, `winners` always holds exactly `k` sorted
/// neuron indices; `support` is the set of neurons that have ever fired and
/// never shrinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    /// Population size.
    pub n: u32,
    /// Target firing-set size.
    pub k: u32,
    /// Plasticity rate applied to edges feeding this area's new winners.
    pub beta: f32,
    winners: Vec<u32>,
    support: BTreeSet<u32>,
    generation: u64,
}

impl Area {
    /// Validate parameters and build an empty (never-fired) area.
    pub fn new(id: AreaId, n: u32, k: u32, beta: f32) -> Result<Self, ConfigurationError> {
        if n == 0 {
            return Err(ConfigurationError::EmptyPopulation);
        }
        if k == 0 {
            return Err(ConfigurationError::EmptyFiringSet);
        }
        if k > n {
            return Err(ConfigurationError::FiringSetExceedsPopulation { k, n });
        }
        if !beta.is_finite() || beta < 0.0 {
            return Err(ConfigurationError::InvalidPlasticityRate { beta });
        }
        Ok(Self {
            id,
            n,
            k,
            beta,
            winners: Vec::new(),
            support: BTreeSet::new(),
            generation: 0,
        })
    }

    /// Current firing set, sorted ascending. Empty until the first projection.
    pub fn winners(&self) -> &[u32] {
        &self.winners
    }

    /// Neurons that have ever fired. Monotonically non-decreasing.
    pub fn support(&self) -> &BTreeSet<u32> {
        &self.support
    }

    pub fn support_len(&self) -> usize {
        self.support.len()
    }

    /// Number of committed projections into this area.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the area has fired at least once.
    pub fn has_fired(&self) -> bool {
        !self.winners.is_empty()
    }

    /// Commit one projection round: overwrite the firing set, grow the
    /// support, bump the generation.
    ///
    /// Called by the connectome only, after the round's winner set is final.
    /// `winners` must hold exactly `k` distinct in-range indices; this is an
    /// internal contract, checked in debug builds.
    pub fn commit_round(&mut self, mut winners: Vec<u32>) {
        winners.sort_unstable();
        debug_assert_eq!(winners.len(), self.k as usize);
        debug_assert!(winners.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(winners.iter().all(|&v| v < self.n));
        self.support.extend(winners.iter().copied());
        self.winners = winners;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_parameters() {
        assert_eq!(
            Area::new(AreaId(0), 0, 1, 0.1).unwrap_err(),
            ConfigurationError::EmptyPopulation
        );
        assert_eq!(
            Area::new(AreaId(0), 10, 0, 0.1).unwrap_err(),
            ConfigurationError::EmptyFiringSet
        );
        assert_eq!(
            Area::new(AreaId(0), 100, 200, 0.1).unwrap_err(),
            ConfigurationError::FiringSetExceedsPopulation { k: 200, n: 100 }
        );
        assert!(matches!(
            Area::new(AreaId(0), 100, 10, -0.5),
            Err(ConfigurationError::InvalidPlasticityRate { .. })
        ));
    }

    #[test]
    fn beta_zero_is_allowed() {
        assert!(Area::new(AreaId(0), 100, 10, 0.0).is_ok());
    }

    #[test]
    fn commit_round_grows_support_and_generation() {
        let mut area = Area::new(AreaId(0), 10, 3, 0.1).unwrap();
        assert!(!area.has_fired());

        area.commit_round(vec![5, 1, 9]);
        assert_eq!(area.winners(), &[1, 5, 9]);
        assert_eq!(area.support_len(), 3);
        assert_eq!(area.generation(), 1);

        area.commit_round(vec![1, 2, 9]);
        assert_eq!(area.winners(), &[1, 2, 9]);
        // 5 left the firing set but stays in the support
        assert_eq!(area.support_len(), 4);
        assert!(area.support().contains(&5));
        assert_eq!(area.generation(), 2);
    }
}
