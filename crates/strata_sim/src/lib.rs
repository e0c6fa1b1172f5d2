//! # STRATA Sim
//!
//! Headless particle simulation on top of `strata_core`.
//!
//! Spawns a fixed population of particles from the origin, integrates them
//! under gravity, recycles expired ones in place and projects them onto a
//! viewport every frame. There is no window: the projected points are the
//! output.
//!
//! ## Example
//!
//! ```rust
//! use strata_sim::{components::ParticleRegistry, SimConfig, Simulation};
//!
//! let config = SimConfig { particle_count: 64, ..SimConfig::default() };
//! let mut sim = Simulation::<ParticleRegistry>::new(config).unwrap();
//! let report = sim.step().unwrap();
//! assert_eq!(report.points, 64);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod components;
pub mod config;
pub mod error;
pub mod particles;
pub mod physics;
pub mod simulation;

pub use config::{RegistryKind, SimConfig, Viewport};
pub use error::{SimError, SimResult};
pub use particles::ParticleSpawner;
pub use simulation::{FrameReport, FrameTimings, Simulation};
