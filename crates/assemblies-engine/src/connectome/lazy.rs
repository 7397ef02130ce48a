// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Lazily-sampled random connectome.
//!
//! Never enumerates the n x n edge space. Structure is realized only at the
//! point it becomes observable:
//!
//! - A realized-edge cache maps `(source unit, target neuron)` pairs to
//!   weights. A cached `0.0` means the edge was realized as absent; a missing
//!   key means the pair has never been sampled. Realized edges are never
//!   deleted and never resampled — only plasticity moves their weights.
//! - Candidates that have been seen before (the target's support, plus any
//!   neuron touched by a point query) are scored exactly, realizing missing
//!   pairs one Bernoulli draw at a time.
//! - Candidates never seen before are scored in aggregate: the live-input
//!   count of such a neuron is `Bin(total_units, p)`, and only the upper tail
//!   can compete for the winner set, so a pool of tail draws stands in for
//!   the `n - visited` unexamined neurons (see `ConnectomeConfig::
//!   fresh_candidate_factor` for the documented miss bound).
//! - A fresh candidate that wins is granted a concrete neuron index and its
//!   aggregate count is attributed to specific source units; every remaining
//!   active unit is realized as absent. Point queries made afterwards
//!   therefore agree with the projection that selected it.

use std::collections::{BTreeMap, BTreeSet};

use ahash::{AHashMap, AHashSet};
use tracing::{debug, info, trace};

use assemblies_structures::{
    Area, AreaId, BrainError, ConfigurationError, ConnectomeConfig, ProjectionMap, Result,
    SourceId, Stimulus, StimulusId,
};

use crate::connectome::{run_round, Connectome, PartRegistry, ProjectCore, RoundOutcome};
use crate::rng::RandomSource;
use crate::select::{take_top_k, CandidateSlot};
use crate::stats::{binomial_ppf, TailSampler};

/// Identity of one realized edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeKey {
    source: SourceId,
    unit: u32,
    target: AreaId,
    neuron: u32,
}

pub struct LazyRandomConnectome {
    config: ConnectomeConfig,
    registry: PartRegistry,
    rng: RandomSource,
    /// Sparse weight store; the key is the only index into it.
    edges: AHashMap<EdgeKey, f32>,
    /// Per target area: neurons with at least one realized incoming edge
    /// (support plus point-query touches). Superset of the area's support.
    visited: AHashMap<AreaId, BTreeSet<u32>>,
    plasticity_enabled: bool,
}

impl LazyRandomConnectome {
    pub fn new(config: ConnectomeConfig) -> core::result::Result<Self, ConfigurationError> {
        config.validate()?;
        let rng = RandomSource::from_seed(config.seed);
        Ok(Self {
            config,
            registry: PartRegistry::default(),
            rng,
            edges: AHashMap::new(),
            visited: AHashMap::new(),
            plasticity_enabled: true,
        })
    }

    /// Number of realized edges (present or absent).
    pub fn realized_edges(&self) -> usize {
        self.edges.len()
    }

    /// Cache hit, or first-time Bernoulli realization. The single code path
    /// for both projections and point queries, so their distributions agree
    /// by construction.
    fn realize_or_get(&mut self, source: SourceId, unit: u32, target: AreaId, neuron: u32) -> f32 {
        let key = EdgeKey {
            source,
            unit,
            target,
            neuron,
        };
        if let Some(&weight) = self.edges.get(&key) {
            return weight;
        }
        let weight = if self.rng.bernoulli(self.config.p) {
            self.config.initial_weight
        } else {
            0.0
        };
        self.edges.insert(key, weight);
        self.visited.entry(target).or_default().insert(neuron);
        weight
    }

    /// Pick an index for a first-time winner, uniform over the never-visited
    /// part of the population.
    fn assign_fresh_index(&mut self, target: AreaId, n: u32) -> Result<u32> {
        let visited = self.visited.entry(target).or_default();
        if visited.len() as u64 >= n as u64 {
            return Err(BrainError::SamplingConsistency {
                context: "fresh index assignment",
                detail: format!("no unvisited neuron left in {target} (n={n})"),
            });
        }
        // Rejection loop; the pool size is clamped to the unvisited count, so
        // a free index always exists.
        loop {
            let candidate = self.rng.uniform_index(n);
            if !visited.contains(&candidate) {
                visited.insert(candidate);
                return Ok(candidate);
            }
        }
    }

    /// Split a fresh winner's aggregate count into concrete source units:
    /// `count` of the active units connect at the initial weight, the rest
    /// are realized as absent.
    fn attribute_fresh_inputs(
        &mut self,
        target: AreaId,
        neuron: u32,
        count: u64,
        active: &[(SourceId, Vec<u32>)],
        total_units: u64,
    ) -> Result<()> {
        let chosen: AHashSet<u64> = self
            .rng
            .sample_distinct(total_units, count as usize)
            .into_iter()
            .collect();
        let mut position = 0u64;
        for (source, units) in active {
            for &unit in units {
                let weight = if chosen.contains(&position) {
                    self.config.initial_weight
                } else {
                    0.0
                };
                let previous = self.edges.insert(
                    EdgeKey {
                        source: *source,
                        unit,
                        target,
                        neuron,
                    },
                    weight,
                );
                if previous.is_some() {
                    return Err(BrainError::SamplingConsistency {
                        context: "fresh winner attribution",
                        detail: format!(
                            "pair ({source}[{unit}] -> {target}[{neuron}]) was already realized"
                        ),
                    });
                }
                position += 1;
            }
        }
        trace!(%target, neuron, count, total_units, "fresh winner realized");
        Ok(())
    }
}

impl ProjectCore for LazyRandomConnectome {
    fn registry(&self) -> &PartRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut PartRegistry {
        &mut self.registry
    }

    fn score_round(
        &mut self,
        target: AreaId,
        active: &[(SourceId, Vec<u32>)],
        total_units: u64,
    ) -> Result<RoundOutcome> {
        let area = self.registry.area(target)?;
        let (n, k, p) = (area.n, area.k as usize, self.config.p);
        let support = area.support().clone();

        let visited_now: Vec<u32> = self
            .visited
            .get(&target)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();

        // Exact inputs for every previously-seen candidate.
        let mut candidates: Vec<(CandidateSlot, f64)> = Vec::with_capacity(visited_now.len() + k);
        for &neuron in &visited_now {
            let mut score = 0.0f64;
            for (source, units) in active {
                for &unit in units {
                    score += self.realize_or_get(*source, unit, target, neuron) as f64;
                }
            }
            candidates.push((CandidateSlot::Established(neuron), score));
        }

        // Aggregate tail draws stand in for the never-visited candidates.
        let effective_n = n as u64 - visited_now.len() as u64;
        let pool = ((k as f64 * self.config.fresh_candidate_factor).ceil() as u64)
            .min(effective_n) as usize;
        let mut alpha = 0;
        if pool > 0 {
            let quantile = (effective_n - pool as u64) as f64 / effective_n as f64;
            alpha = binomial_ppf(quantile, total_units, p);
            let sampler = TailSampler::new(total_units, p, alpha);
            for j in 0..pool {
                let draw = sampler.sample(&mut self.rng);
                candidates.push((CandidateSlot::Fresh(j), draw));
            }
        }
        debug!(
            target_area = %target,
            total_units,
            visited = visited_now.len(),
            pool,
            alpha,
            "lazy scoring"
        );

        let selected = take_top_k(candidates, k);

        // Give winning fresh candidates real indices and concrete edges.
        let mut winners = Vec::with_capacity(k);
        for (slot, score) in selected {
            match slot {
                CandidateSlot::Established(neuron) => winners.push(neuron),
                CandidateSlot::Fresh(_) => {
                    let count = score as u64;
                    if count > total_units {
                        return Err(BrainError::SamplingConsistency {
                            context: "fresh winner count",
                            detail: format!(
                                "aggregate count {count} exceeds {total_units} active units"
                            ),
                        });
                    }
                    let neuron = self.assign_fresh_index(target, n)?;
                    self.attribute_fresh_inputs(target, neuron, count, active, total_units)?;
                    winners.push(neuron);
                }
            }
        }
        winners.sort_unstable();

        let first_winners = winners.iter().filter(|v| !support.contains(*v)).count();

        // Plasticity, after the winner set is final: every edge from an
        // active unit into a winner is realized by now.
        if self.plasticity_enabled {
            let beta = self.registry.area(target)?.beta;
            for (source, units) in active {
                for &unit in units {
                    for &neuron in &winners {
                        let key = EdgeKey {
                            source: *source,
                            unit,
                            target,
                            neuron,
                        };
                        match self.edges.get_mut(&key) {
                            Some(weight) => *weight *= 1.0 + beta,
                            None => {
                                return Err(BrainError::SamplingConsistency {
                                    context: "plasticity",
                                    detail: format!(
                                        "edge ({source}[{unit}] -> {target}[{neuron}]) \
                                         missing after winner realization"
                                    ),
                                })
                            }
                        }
                    }
                }
            }
        }

        Ok(RoundOutcome {
            winners,
            first_winners,
        })
    }

    fn commit_round(&mut self, target: AreaId, winners: Vec<u32>) {
        // Keep visited a superset of support (covers the zero-input path,
        // where winners were picked without realizing anything).
        self.visited
            .entry(target)
            .or_default()
            .extend(winners.iter().copied());
        self.registry
            .area_mut(target)
            .expect("target validated before scoring")
            .commit_round(winners);
    }
}

impl Connectome for LazyRandomConnectome {
    fn config(&self) -> &ConnectomeConfig {
        &self.config
    }

    fn add_area(&mut self, n: u32, k: u32, beta: f32) -> Result<AreaId> {
        let id = self.registry.register_area(n, k, beta)?;
        info!(area = %id, n, k, beta, "registered area (lazy)");
        Ok(id)
    }

    fn add_stimulus(&mut self, size: u32) -> Result<StimulusId> {
        let id = self.registry.register_stimulus(size)?;
        info!(stimulus = %id, size, "registered stimulus (lazy)");
        Ok(id)
    }

    fn area(&self, id: AreaId) -> Result<&Area> {
        Ok(self.registry.area(id)?)
    }

    fn stimulus(&self, id: StimulusId) -> Result<&Stimulus> {
        Ok(self.registry.stimulus(id)?)
    }

    fn area_ids(&self) -> Vec<AreaId> {
        self.registry.area_ids()
    }

    fn stimulus_ids(&self) -> Vec<StimulusId> {
        self.registry.stimulus_ids()
    }

    fn project_round(&mut self, round: &ProjectionMap) -> Result<BTreeMap<AreaId, Vec<u32>>> {
        let silent_bootstrap = self.config.silent_bootstrap;
        run_round(self, round, silent_bootstrap)
    }

    fn get_weight(
        &mut self,
        source: SourceId,
        unit: u32,
        target: AreaId,
        neuron: u32,
    ) -> Result<f32> {
        self.registry.check_unit(source, unit)?;
        self.registry.check_neuron(target, neuron)?;
        Ok(self.realize_or_get(source, unit, target, neuron))
    }

    fn set_weight(
        &mut self,
        source: SourceId,
        unit: u32,
        target: AreaId,
        neuron: u32,
        weight: f32,
    ) -> Result<()> {
        self.registry.check_unit(source, unit)?;
        self.registry.check_neuron(target, neuron)?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigurationError::InvalidWeight { weight }.into());
        }
        self.edges.insert(
            EdgeKey {
                source,
                unit,
                target,
                neuron,
            },
            weight,
        );
        self.visited.entry(target).or_default().insert(neuron);
        Ok(())
    }

    fn plasticity_enabled(&self) -> bool {
        self.plasticity_enabled
    }

    fn set_plasticity_enabled(&mut self, enabled: bool) {
        self.plasticity_enabled = enabled;
    }

    fn set_area_beta(&mut self, area: AreaId, beta: f32) -> Result<()> {
        self.registry.set_area_beta(area, beta)
    }
}
