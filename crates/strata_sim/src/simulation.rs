//! # Frame Loop
//!
//! One frame runs three phases over the same world:
//!
//! ```text
//! update physics ──▶ update particles ──▶ draw (project points)
//! ```

use std::time::{Duration, Instant};

use strata_core::{Registry, World};

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::particles::ParticleSpawner;
use crate::physics::{project_points, update_physics, Point};

/// Wall-clock time spent in each phase of one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameTimings {
    /// Integration.
    pub physics: Duration,
    /// Aging and respawning.
    pub particles: Duration,
    /// Point projection.
    pub draw: Duration,
}

impl FrameTimings {
    /// Sum of all phases.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.physics + self.particles + self.draw
    }
}

/// What one frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Particles respawned this frame.
    pub respawned: usize,
    /// Points produced by the draw phase.
    pub points: usize,
    /// Phase timings.
    pub timings: FrameTimings,
}

/// A populated world plus everything needed to step it.
pub struct Simulation<R: Registry> {
    world: World<R>,
    spawner: ParticleSpawner,
    config: SimConfig,
    points: Vec<Point>,
}

impl<R: Registry + Default> Simulation<R> {
    /// Builds the world and spawns `config.particle_count` particles.
    ///
    /// # Errors
    ///
    /// Propagates configuration and storage errors.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let mut world = World::<R>::with_config(config.world.clone())?;
        let mut spawner = ParticleSpawner::new(config.seed);
        spawner.create_particles(&mut world, config.particle_count)?;

        Ok(Self {
            world,
            spawner,
            points: Vec::with_capacity(config.particle_count),
            config,
        })
    }
}

impl<R: Registry> Simulation<R> {
    /// Returns the world.
    #[must_use]
    pub fn world(&self) -> &World<R> {
        &self.world
    }

    /// Returns the points produced by the last frame.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Runs one frame with the configured time step.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn step(&mut self) -> SimResult<FrameReport> {
        let dt = self.config.dt;

        let start = Instant::now();
        update_physics(&mut self.world, dt, self.config.gravity)?;
        let physics = start.elapsed();

        let start = Instant::now();
        let respawned = self.spawner.update(&mut self.world, dt)?;
        let particles = start.elapsed();

        let start = Instant::now();
        project_points(&mut self.world, self.config.viewport, &mut self.points)?;
        let draw = start.elapsed();

        Ok(FrameReport {
            respawned,
            points: self.points.len(),
            timings: FrameTimings {
                physics,
                particles,
                draw,
            },
        })
    }
}
