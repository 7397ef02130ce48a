// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Eagerly-materialized random connectome.
//!
//! At registration time every ordered (source, target-area) pair gets a full
//! `units x neurons` weight matrix: each entry is `initial_weight` with
//! probability p, else 0. That commits to the entire random graph up front,
//! so this variant is only feasible for small populations — it exists as the
//! reference oracle whose winner statistics the lazy variant must match in
//! distribution.
//!
//! Each pair's matrix is generated from a sub-stream derived from the
//! connectome seed and the pair identity, so a given pair's edges do not
//! depend on how many other parts were registered first.

use std::collections::BTreeMap;

use ahash::AHashMap;
use ndarray::Array2;
use tracing::info;

use assemblies_structures::{
    Area, AreaId, ConfigurationError, ConnectomeConfig, ProjectionMap, Result, SourceId, Stimulus,
    StimulusId,
};

use crate::connectome::{run_round, Connectome, PartRegistry, ProjectCore, RoundOutcome};
use crate::rng::RandomSource;
use crate::select::{take_top_k, CandidateSlot};

pub struct NonLazyRandomConnectome {
    config: ConnectomeConfig,
    registry: PartRegistry,
    rng: RandomSource,
    /// One dense weight matrix per ordered (source, target) pair:
    /// `matrix[[unit, neuron]]`.
    matrices: AHashMap<(SourceId, AreaId), Array2<f32>>,
    plasticity_enabled: bool,
}

impl NonLazyRandomConnectome {
    pub fn new(config: ConnectomeConfig) -> core::result::Result<Self, ConfigurationError> {
        config.validate()?;
        let rng = RandomSource::from_seed(config.seed);
        Ok(Self {
            config,
            registry: PartRegistry::default(),
            rng,
            matrices: AHashMap::new(),
            plasticity_enabled: true,
        })
    }

    fn materialize_pair(&mut self, source: SourceId, target: AreaId) {
        let rows = self
            .registry
            .source_size(source)
            .expect("pair endpoints are registered") as usize;
        let cols = self
            .registry
            .area(target)
            .expect("pair endpoints are registered")
            .n as usize;
        let mut stream = self.rng.substream(pair_tag(source, target));
        let p = self.config.p;
        let present = self.config.initial_weight;
        let matrix = Array2::from_shape_fn((rows, cols), |_| {
            if stream.bernoulli(p) {
                present
            } else {
                0.0
            }
        });
        self.matrices.insert((source, target), matrix);
    }

    fn matrix(&self, source: SourceId, target: AreaId) -> &Array2<f32> {
        self.matrices
            .get(&(source, target))
            .expect("every registered pair is materialized")
    }
}

/// Stable per-pair tag for sub-stream derivation.
fn pair_tag(source: SourceId, target: AreaId) -> u64 {
    let (kind, id) = match source {
        SourceId::Stimulus(StimulusId(id)) => (1u64, id),
        SourceId::Area(AreaId(id)) => (0u64, id),
    };
    (kind << 63) | ((id as u64) << 32) | target.0 as u64
}

impl ProjectCore for NonLazyRandomConnectome {
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
        _total_units: u64,
    ) -> Result<RoundOutcome> {
        let area = self.registry.area(target)?;
        let (n, k) = (area.n as usize, area.k as usize);

        // Exact input sums over the whole population.
        let mut inputs = vec![0.0f64; n];
        for (source, units) in active {
            let matrix = self.matrix(*source, target);
            for &unit in units {
                for (neuron, weight) in matrix.row(unit as usize).iter().enumerate() {
                    inputs[neuron] += *weight as f64;
                }
            }
        }

        let candidates: Vec<(CandidateSlot, f64)> = inputs
            .iter()
            .enumerate()
            .map(|(neuron, &score)| (CandidateSlot::Established(neuron as u32), score))
            .collect();
        let mut winners: Vec<u32> = take_top_k(candidates, k)
            .into_iter()
            .map(|(slot, _)| match slot {
                CandidateSlot::Established(neuron) => neuron,
                CandidateSlot::Fresh(_) => unreachable!("dense scoring has no fresh candidates"),
            })
            .collect();
        winners.sort_unstable();

        let area = self.registry.area(target)?;
        let first_winners = winners
            .iter()
            .filter(|v| !area.support().contains(*v))
            .count();
        let beta = area.beta;

        if self.plasticity_enabled {
            for (source, units) in active {
                let matrix = self
                    .matrices
                    .get_mut(&(*source, target))
                    .expect("every registered pair is materialized");
                for &unit in units {
                    for &neuron in &winners {
                        matrix[[unit as usize, neuron as usize]] *= 1.0 + beta;
                    }
                }
            }
        }

        Ok(RoundOutcome {
            winners,
            first_winners,
        })
    }
}

impl Connectome for NonLazyRandomConnectome {
    fn config(&self) -> &ConnectomeConfig {
        &self.config
    }

    fn add_area(&mut self, n: u32, k: u32, beta: f32) -> Result<AreaId> {
        let id = self.registry.register_area(n, k, beta)?;
        // Incoming edges from every stimulus and every area (self included),
        // outgoing edges into every other area; id order throughout.
        for stimulus in self.registry.stimulus_ids() {
            self.materialize_pair(SourceId::Stimulus(stimulus), id);
        }
        for other in self.registry.area_ids() {
            self.materialize_pair(SourceId::Area(other), id);
            if other != id {
                self.materialize_pair(SourceId::Area(id), other);
            }
        }
        info!(area = %id, n, k, beta, "registered area (eager)");
        Ok(id)
    }

    fn add_stimulus(&mut self, size: u32) -> Result<StimulusId> {
        let id = self.registry.register_stimulus(size)?;
        for area in self.registry.area_ids() {
            self.materialize_pair(SourceId::Stimulus(id), area);
        }
        info!(stimulus = %id, size, "registered stimulus (eager)");
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
        Ok(self.matrix(source, target)[[unit as usize, neuron as usize]])
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
        let matrix = self
            .matrices
            .get_mut(&(source, target))
            .expect("every registered pair is materialized");
        matrix[[unit as usize, neuron as usize]] = weight;
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
