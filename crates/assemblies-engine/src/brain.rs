// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Session-level orchestrator.
//!
//! A [`Brain`] owns one connectome — variant chosen at construction — and
//! drives stepwise simulation against the [`Connectome`] trait only, never
//! against variant internals.

use std::collections::BTreeMap;

use tracing::debug;

use assemblies_structures::{
    Area, AreaId, Assembly, ConfigurationError, ConnectomeConfig, ProjectionMap, Result, SourceId,
    Stimulus, StimulusId,
};

use crate::connectome::{Connectome, LazyRandomConnectome, NonLazyRandomConnectome};

/// Which connectome variant a brain is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectomeKind {
    /// Eager full materialization — small populations, reference behavior.
    NonLazy,
    /// On-demand sampling — the scale the model is actually run at.
    Lazy,
}

pub struct Brain {
    connectome: Box<dyn Connectome>,
}

impl Brain {
    pub fn new(
        kind: ConnectomeKind,
        config: ConnectomeConfig,
    ) -> core::result::Result<Self, ConfigurationError> {
        let connectome: Box<dyn Connectome> = match kind {
            ConnectomeKind::NonLazy => Box::new(NonLazyRandomConnectome::new(config)?),
            ConnectomeKind::Lazy => Box::new(LazyRandomConnectome::new(config)?),
        };
        Ok(Self { connectome })
    }

    /// Build over an existing connectome (e.g. one with pre-set weights).
    pub fn with_connectome(connectome: Box<dyn Connectome>) -> Self {
        Self { connectome }
    }

    pub fn config(&self) -> &ConnectomeConfig {
        self.connectome.config()
    }

    pub fn add_area(&mut self, n: u32, k: u32, beta: f32) -> Result<AreaId> {
        self.connectome.add_area(n, k, beta)
    }

    pub fn add_stimulus(&mut self, size: u32) -> Result<StimulusId> {
        self.connectome.add_stimulus(size)
    }

    pub fn area(&self, id: AreaId) -> Result<&Area> {
        self.connectome.area(id)
    }

    pub fn stimulus(&self, id: StimulusId) -> Result<&Stimulus> {
        self.connectome.stimulus(id)
    }

    pub fn area_ids(&self) -> Vec<AreaId> {
        self.connectome.area_ids()
    }

    pub fn stimulus_ids(&self) -> Vec<StimulusId> {
        self.connectome.stimulus_ids()
    }

    /// One projection into a single target; returns its new winners.
    pub fn project(&mut self, sources: &[SourceId], target: AreaId) -> Result<Vec<u32>> {
        self.connectome.project(sources, target)
    }

    /// One full round over possibly many targets (double-buffered: every
    /// target sees pre-round source winners).
    pub fn project_round(&mut self, round: &ProjectionMap) -> Result<BTreeMap<AreaId, Vec<u32>>> {
        self.connectome.project_round(round)
    }

    pub fn get_weight(
        &mut self,
        source: SourceId,
        unit: u32,
        target: AreaId,
        neuron: u32,
    ) -> Result<f32> {
        self.connectome.get_weight(source, unit, target, neuron)
    }

    pub fn set_weight(
        &mut self,
        source: SourceId,
        unit: u32,
        target: AreaId,
        neuron: u32,
        weight: f32,
    ) -> Result<()> {
        self.connectome.set_weight(source, unit, target, neuron, weight)
    }

    pub fn plasticity_enabled(&self) -> bool {
        self.connectome.plasticity_enabled()
    }

    pub fn set_plasticity_enabled(&mut self, enabled: bool) {
        self.connectome.set_plasticity_enabled(enabled);
    }

    pub fn set_area_beta(&mut self, area: AreaId, beta: f32) -> Result<()> {
        self.connectome.set_area_beta(area, beta)
    }

    /// Snapshot of an area's current firing set, decoupled from later
    /// mutation.
    pub fn assembly(&self, area: AreaId) -> Result<Assembly> {
        self.connectome.assembly(area)
    }

    /// Repeat `project(sources, target)` for up to `rounds` rounds, yielding
    /// one [`Assembly`] snapshot per round. The sequence is lazy and ends
    /// early at the first round whose winners equal the previous round's —
    /// the converged round is yielded, then iteration stops. Calling `run`
    /// again restarts from the current state.
    pub fn run(&mut self, rounds: usize, sources: &[SourceId], target: AreaId) -> Run<'_> {
        Run {
            brain: self,
            sources: sources.to_vec(),
            target,
            remaining: rounds,
            previous: None,
            done: false,
        }
    }
}

/// Lazy round sequence produced by [`Brain::run`].
pub struct Run<'a> {
    brain: &'a mut Brain,
    sources: Vec<SourceId>,
    target: AreaId,
    remaining: usize,
    previous: Option<Vec<u32>>,
    done: bool,
}

impl Iterator for Run<'_> {
    type Item = Result<Assembly>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let winners = match self.brain.project(&self.sources, self.target) {
            Ok(winners) => winners,
            Err(error) => {
                self.done = true;
                return Some(Err(error));
            }
        };
        if self.previous.as_deref() == Some(winners.as_slice()) {
            debug!(target_area = %self.target, "converged");
            self.done = true;
        }
        self.previous = Some(winners);
        let snapshot = self.brain.assembly(self.target);
        Some(snapshot)
    }
}
