// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::ids::StimulusId;

/// An external, unconditioned input source: `size` always-firing virtual
/// units feeding into areas. Immutable after registration; the weights of its
/// outgoing edges live on the connectome, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stimulus {
    pub id: StimulusId,
    pub size: u32,
}

impl Stimulus {
    pub fn new(id: StimulusId, size: u32) -> Result<Self, ConfigurationError> {
        if size == 0 {
            return Err(ConfigurationError::EmptyStimulus);
        }
        Ok(Self { id, size })
    }
}
