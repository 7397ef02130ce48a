// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Assemblies Structures
//!
//! Foundation types for the assembly-calculus simulation core: identity
//! newtypes, the per-area and per-stimulus state containers, the derived
//! [`Assembly`] snapshot, the error taxonomy, and the configuration surface.
//!
//! Nothing in this crate performs simulation work. Areas and stimuli are
//! registered with a connectome (see `assemblies-engine`) which is their sole
//! mutator; everything here is state plus validation.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod area;
pub mod assembly;
pub mod config;
pub mod error;
pub mod ids;
pub mod projection;
pub mod stimulus;

// Re-export commonly used types
pub use area::Area;
pub use assembly::{overlaps_with_base, Assembly};
pub use config::{ConfigLoadError, ConnectomeConfig};
pub use error::{BrainError, ConfigurationError, Result, UnknownEntityError};
pub use ids::{AreaId, SourceId, StimulusId};
pub use projection::ProjectionMap;
pub use stimulus::Stimulus;
