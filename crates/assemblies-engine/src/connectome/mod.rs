// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The connectome capability contract and its variants.
//!
//! A connectome owns every area, stimulus, and synapse weight of one
//! simulated brain, and is their sole mutator. Callers pick a variant at
//! construction and depend only on the [`Connectome`] trait:
//!
//! - [`NonLazyRandomConnectome`] materializes every pairwise edge eagerly —
//!   feasible only for small populations, used as the reference oracle.
//! - [`LazyRandomConnectome`] samples edges only when they become observable,
//!   which is what makes populations around 10^7 tractable.
//!
//! Both variants share the same winner-take-k policy, plasticity rule, and
//! round semantics; only the sampling strategy differs.

pub mod lazy;
pub mod nonlazy;

pub use lazy::LazyRandomConnectome;
pub use nonlazy::NonLazyRandomConnectome;

use std::collections::BTreeMap;

use assemblies_structures::{
    Area, AreaId, Assembly, BrainError, ConfigurationError, ConnectomeConfig, ProjectionMap,
    Result, SourceId, Stimulus, StimulusId, UnknownEntityError,
};

/// Capability set over one brain's connectivity.
///
/// All operations validate before mutating: a failed call leaves the
/// connectome, its areas, and its stimuli unchanged.
pub trait Connectome {
    fn config(&self) -> &ConnectomeConfig;

    /// Register a new area with empty winners/support.
    fn add_area(&mut self, n: u32, k: u32, beta: f32) -> Result<AreaId>;

    /// Register a new always-firing external input.
    fn add_stimulus(&mut self, size: u32) -> Result<StimulusId>;

    fn area(&self, id: AreaId) -> Result<&Area>;

    fn stimulus(&self, id: StimulusId) -> Result<&Stimulus>;

    /// Registered area ids, ascending.
    fn area_ids(&self) -> Vec<AreaId>;

    /// Registered stimulus ids, ascending.
    fn stimulus_ids(&self) -> Vec<StimulusId>;

    /// Run one full round: for every target in `round`, compute the new
    /// firing set from its sources' pre-round state, realize the implicated
    /// edges, apply plasticity, and finally commit all winner sets at once —
    /// mutual projections (A into B and B into A) both see the old
    /// assemblies.
    fn project_round(&mut self, round: &ProjectionMap) -> Result<BTreeMap<AreaId, Vec<u32>>>;

    /// Single-target convenience over [`Connectome::project_round`]. Returns
    /// the new winners of `target`, sorted ascending.
    fn project(&mut self, sources: &[SourceId], target: AreaId) -> Result<Vec<u32>> {
        let mut round = ProjectionMap::new();
        round.add_target(target, sources);
        let mut winners = self.project_round(&round)?;
        Ok(winners
            .remove(&target)
            .expect("round with one target yields one winner set"))
    }

    /// Weight of the edge from `unit` of `source` into `neuron` of `target`.
    ///
    /// The lazy variant realizes the edge on first access with exactly the
    /// distribution a projection would use, then caches it: a second query
    /// reads the cache, never resamples.
    fn get_weight(&mut self, source: SourceId, unit: u32, target: AreaId, neuron: u32)
        -> Result<f32>;

    /// Overwrite (realizing if needed) one edge weight.
    fn set_weight(
        &mut self,
        source: SourceId,
        unit: u32,
        target: AreaId,
        neuron: u32,
        weight: f32,
    ) -> Result<()>;

    fn plasticity_enabled(&self) -> bool;

    /// Freeze or thaw plasticity; projections keep selecting winners either
    /// way, but frozen rounds leave every weight untouched.
    fn set_plasticity_enabled(&mut self, enabled: bool);

    /// Update an area's plasticity rate for subsequent rounds.
    fn set_area_beta(&mut self, area: AreaId, beta: f32) -> Result<()>;

    /// Decoupled snapshot of an area's current firing set.
    fn assembly(&self, area: AreaId) -> Result<Assembly> {
        Ok(Assembly::as_of(self.area(area)?))
    }
}

/// Area/stimulus bookkeeping shared by both variants. `BTreeMap` so every
/// iteration over registered parts is in id order — registration and
/// projection consume randomness deterministically.
#[derive(Debug, Clone, Default)]
pub(crate) struct PartRegistry {
    areas: BTreeMap<AreaId, Area>,
    stimuli: BTreeMap<StimulusId, Stimulus>,
    next_area: u32,
    next_stimulus: u32,
}

impl PartRegistry {
    pub(crate) fn register_area(
        &mut self,
        n: u32,
        k: u32,
        beta: f32,
    ) -> core::result::Result<AreaId, ConfigurationError> {
        let id = AreaId(self.next_area);
        let area = Area::new(id, n, k, beta)?;
        self.next_area += 1;
        self.areas.insert(id, area);
        Ok(id)
    }

    pub(crate) fn register_stimulus(
        &mut self,
        size: u32,
    ) -> core::result::Result<StimulusId, ConfigurationError> {
        let id = StimulusId(self.next_stimulus);
        let stimulus = Stimulus::new(id, size)?;
        self.next_stimulus += 1;
        self.stimuli.insert(id, stimulus);
        Ok(id)
    }

    pub(crate) fn area(&self, id: AreaId) -> core::result::Result<&Area, UnknownEntityError> {
        self.areas.get(&id).ok_or(UnknownEntityError::Area(id))
    }

    pub(crate) fn area_mut(
        &mut self,
        id: AreaId,
    ) -> core::result::Result<&mut Area, UnknownEntityError> {
        self.areas.get_mut(&id).ok_or(UnknownEntityError::Area(id))
    }

    pub(crate) fn stimulus(
        &self,
        id: StimulusId,
    ) -> core::result::Result<&Stimulus, UnknownEntityError> {
        self.stimuli
            .get(&id)
            .ok_or(UnknownEntityError::Stimulus(id))
    }

    pub(crate) fn area_ids(&self) -> Vec<AreaId> {
        self.areas.keys().copied().collect()
    }

    pub(crate) fn stimulus_ids(&self) -> Vec<StimulusId> {
        self.stimuli.keys().copied().collect()
    }

    /// Unit count of a source: a stimulus's full size, an area's population.
    pub(crate) fn source_size(
        &self,
        source: SourceId,
    ) -> core::result::Result<u32, UnknownEntityError> {
        match source {
            SourceId::Stimulus(id) => Ok(self.stimulus(id)?.size),
            SourceId::Area(id) => Ok(self.area(id)?.n),
        }
    }

    /// The units of `source` firing this round: every unit of a stimulus,
    /// the current winners of an area.
    pub(crate) fn active_units(
        &self,
        source: SourceId,
    ) -> core::result::Result<Vec<u32>, UnknownEntityError> {
        match source {
            SourceId::Stimulus(id) => Ok((0..self.stimulus(id)?.size).collect()),
            SourceId::Area(id) => Ok(self.area(id)?.winners().to_vec()),
        }
    }

    pub(crate) fn check_unit(
        &self,
        source: SourceId,
        unit: u32,
    ) -> core::result::Result<(), UnknownEntityError> {
        let size = self.source_size(source)?;
        if unit >= size {
            return Err(UnknownEntityError::UnitOutOfRange { src: source, unit, size });
        }
        Ok(())
    }

    pub(crate) fn check_neuron(
        &self,
        area: AreaId,
        neuron: u32,
    ) -> core::result::Result<(), UnknownEntityError> {
        let n = self.area(area)?.n;
        if neuron >= n {
            return Err(UnknownEntityError::NeuronOutOfRange { area, neuron, n });
        }
        Ok(())
    }

    pub(crate) fn set_area_beta(&mut self, id: AreaId, beta: f32) -> Result<()> {
        if !beta.is_finite() || beta < 0.0 {
            return Err(ConfigurationError::InvalidPlasticityRate { beta }.into());
        }
        self.area_mut(id)?.beta = beta;
        Ok(())
    }
}

/// Result of scoring one target: the winner set (sorted ascending) and how
/// many of them fired for the first time.
#[derive(Debug, Clone)]
pub(crate) struct RoundOutcome {
    pub winners: Vec<u32>,
    pub first_winners: usize,
}

/// The per-variant half of a projection round.
pub(crate) trait ProjectCore {
    fn registry(&self) -> &PartRegistry;

    fn registry_mut(&mut self) -> &mut PartRegistry;

    /// Score candidates, select winners, realize implicated edges, and apply
    /// plasticity for one target — without committing winners/support.
    /// `active` holds each source with its firing units (pre-round state);
    /// `total_units` is their summed size and is never zero here.
    fn score_round(
        &mut self,
        target: AreaId,
        active: &[(SourceId, Vec<u32>)],
        total_units: u64,
    ) -> Result<RoundOutcome>;

    /// Commit a finalized winner set. Variants with extra bookkeeping (the
    /// lazy visited set) override and delegate back.
    fn commit_round(&mut self, target: AreaId, winners: Vec<u32>) {
        self.registry_mut()
            .area_mut(target)
            .expect("target validated before scoring")
            .commit_round(winners);
    }
}

/// Shared round driver: validate everything, score every target against
/// pre-round state, then commit all targets. Used by both variants'
/// `project_round`.
pub(crate) fn run_round<C: ProjectCore>(
    core: &mut C,
    round: &ProjectionMap,
    silent_bootstrap: bool,
) -> Result<BTreeMap<AreaId, Vec<u32>>> {
    // Validation pass: no mutation may happen before every id and the
    // activation precondition have been checked.
    let mut plans = Vec::with_capacity(round.len());
    for (target, sources) in round.iter() {
        let area = core.registry().area(target)?;
        let mut active = Vec::with_capacity(sources.len());
        let mut total_units: u64 = 0;
        for &source in sources {
            let units = core.registry().active_units(source)?;
            total_units += units.len() as u64;
            active.push((source, units));
        }
        if total_units == 0 && !area.has_fired() && !silent_bootstrap {
            return Err(BrainError::InsufficientActivation { area: target });
        }
        plans.push((target, active, total_units));
    }

    // Scoring pass: every target sees its sources' pre-round winners (the
    // active lists were captured above).
    let mut outcomes = Vec::with_capacity(plans.len());
    for (target, active, total_units) in plans {
        let outcome = if total_units == 0 {
            zero_input_round(core.registry(), target)?
        } else {
            core.score_round(target, &active, total_units)?
        };
        outcomes.push((target, outcome));
    }

    // Commit pass.
    let mut winners_by_target = BTreeMap::new();
    for (target, outcome) in outcomes {
        tracing::debug!(
            target_area = %target,
            winners = outcome.winners.len(),
            first_winners = outcome.first_winners,
            "round committed"
        );
        core.commit_round(target, outcome.winners.clone());
        winners_by_target.insert(target, outcome.winners);
    }
    Ok(winners_by_target)
}

/// A round with zero active input units: every candidate ties at zero, so
/// the k lowest-indexed neurons fire. Reached only for an area that has
/// already fired, or under the silent-bootstrap fallback; nothing is
/// realized and plasticity has nothing to strengthen.
fn zero_input_round(registry: &PartRegistry, target: AreaId) -> Result<RoundOutcome> {
    let area = registry.area(target)?;
    let winners: Vec<u32> = (0..area.k).collect();
    let first_winners = winners
        .iter()
        .filter(|v| !area.support().contains(*v))
        .count();
    Ok(RoundOutcome {
        winners,
        first_winners,
    })
}
