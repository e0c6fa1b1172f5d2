//! # Scenario Configuration
//!
//! ```toml
//! particle_count = 16384
//! frames = 600
//! dt = 0.016
//! seed = 42
//! gravity = 100.0
//! registry = "static"
//!
//! [viewport]
//! width = 620.0
//! height = 387.0
//!
//! [world]
//! chunk_capacity = 1024
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::WorldConfig;

use crate::error::{SimError, SimResult};

/// Which registry flavor backs the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    /// Indices assigned on first use.
    #[default]
    Dynamic,
    /// Indices fixed by the particle component list.
    Static,
}

/// Size of the surface points are projected onto.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 620.0,
            height: 387.0,
        }
    }
}

/// One simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Particles alive at any time.
    pub particle_count: usize,
    /// Frames to simulate.
    pub frames: u32,
    /// Fixed time step in seconds.
    pub dt: f32,
    /// Spawner seed; equal seeds replay equal runs.
    pub seed: u64,
    /// Downward acceleration before dividing by mass.
    pub gravity: f32,
    /// Registry flavor.
    pub registry: RegistryKind,
    /// Projection surface.
    pub viewport: Viewport,
    /// Storage limits.
    pub world: WorldConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            particle_count: 4 * 4 * 1024,
            frames: 600,
            dt: 1.0 / 60.0,
            seed: 0x5EED,
            gravity: 100.0,
            registry: RegistryKind::default(),
            viewport: Viewport::default(),
            world: WorldConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parses and validates a scenario from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] on malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> SimResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as
    /// [`SimConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] naming the first bad field.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::Config("dt must be a positive number".into()));
        }
        if !self.gravity.is_finite() {
            return Err(SimError::Config("gravity must be finite".into()));
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(SimError::Config("viewport must have a positive size".into()));
        }
        self.world
            .validate()
            .map_err(|e| SimError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo() {
        let config = SimConfig::default();
        assert_eq!(config.particle_count, 16_384);
        assert!((config.gravity - 100.0).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_scenario() {
        let config = SimConfig::from_toml_str(
            r#"
            particle_count = 10
            frames = 3
            dt = 0.5
            seed = 7
            registry = "static"

            [viewport]
            width = 100.0

            [world]
            chunk_capacity = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.particle_count, 10);
        assert_eq!(config.registry, RegistryKind::Static);
        assert!((config.viewport.height - 387.0).abs() < f32::EPSILON);
        assert_eq!(config.world.chunk_capacity, 4);
    }

    #[test]
    fn test_rejects_non_positive_dt() {
        assert!(matches!(
            SimConfig::from_toml_str("dt = 0.0"),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_bad_world_table() {
        assert!(matches!(
            SimConfig::from_toml_str("[world]\nmax_archetypes = 0"),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn test_bundled_scenario_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/default.toml");
        let config = SimConfig::load(path).unwrap();
        assert_eq!(config.particle_count, 16_384);
        assert_eq!(config.registry, RegistryKind::Static);
        assert_eq!(config.world.max_archetypes, 8);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SimConfig::load("/definitely/not/here.toml"),
            Err(SimError::Io(_))
        ));
    }
}
