// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identity types for areas, stimuli, and projection sources

use core::fmt;

use serde::{Deserialize, Serialize};

/// Area ID (unique within one connectome)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AreaId(pub u32);

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Area({})", self.0)
    }
}

/// Stimulus ID (unique within one connectome)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StimulusId(pub u32);

impl fmt::Display for StimulusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stimulus({})", self.0)
    }
}

/// A projection source: either a registered area (its current winners fire)
/// or a stimulus (all of its units fire, unconditionally).
///
/// The ordering is stimuli-before-areas, then by id. Connectomes rely on this
/// whenever source collections must be iterated deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceId {
    Stimulus(StimulusId),
    Area(AreaId),
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Stimulus(id) => write!(f, "{id}"),
            SourceId::Area(id) => write!(f, "{id}"),
        }
    }
}

impl From<AreaId> for SourceId {
    fn from(id: AreaId) -> Self {
        SourceId::Area(id)
    }
}

impl From<StimulusId> for SourceId {
    fn from(id: StimulusId) -> Self {
        SourceId::Stimulus(id)
    }
}
