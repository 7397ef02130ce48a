// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Round descriptions for multi-target projection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{AreaId, SourceId};

/// One simulation round: for each target area, the sources whose active units
/// fire into it.
///
/// Targets iterate in id order so connectomes consume randomness in a fixed
/// order for a given map; the sources of each target keep their insertion
/// order. A source contributes to a target once per round — duplicate
/// additions are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionMap {
    targets: BTreeMap<AreaId, Vec<SourceId>>,
}

impl ProjectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `source` into `target` this round.
    pub fn add(&mut self, source: impl Into<SourceId>, target: AreaId) -> &mut Self {
        let source = source.into();
        let sources = self.targets.entry(target).or_default();
        if !sources.contains(&source) {
            sources.push(source);
        }
        self
    }

    /// Register `target` with an explicit source list (possibly empty — an
    /// empty list still makes `target` part of the round).
    pub fn add_target(&mut self, target: AreaId, sources: &[SourceId]) -> &mut Self {
        let list = self.targets.entry(target).or_default();
        for &source in sources {
            if !list.contains(&source) {
                list.push(source);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Targets with their sources, in target-id order.
    pub fn iter(&self) -> impl Iterator<Item = (AreaId, &[SourceId])> + '_ {
        self.targets.iter().map(|(&t, s)| (t, s.as_slice()))
    }

    pub fn sources_of(&self, target: AreaId) -> Option<&[SourceId]> {
        self.targets.get(&target).map(|s| s.as_slice())
    }
}
