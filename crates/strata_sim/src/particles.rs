//! # Particle Spawner
//!
//! Particles start at the origin with a random heading and speed. Once a
//! particle's lifetime runs out its record is overwritten with a fresh
//! particle in place, so the population stays constant and no handle ever
//! changes.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_core::{Entity, Registry, World};

use crate::components::{ParticleInfo, Pos, Speed};
use crate::error::SimResult;

/// Seeded particle generator.
#[derive(Clone, Debug)]
pub struct ParticleSpawner {
    rng: ChaCha8Rng,
}

impl ParticleSpawner {
    /// Creates a spawner; equal seeds produce equal particle streams.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draws one particle.
    ///
    /// - heading in `[0, 2π)`
    /// - speed magnitude in `[5, 100)`
    /// - mass in `[1, 10)`
    /// - lifetime in `[0, 5)` seconds
    pub fn particle(&mut self) -> (Pos, Speed, ParticleInfo) {
        let angle: f32 = self.rng.gen_range(0.0..TAU);
        let amplitude: f32 = self.rng.gen_range(5.0..100.0);
        let mass: f32 = self.rng.gen_range(1.0..10.0);
        let lifetime: f32 = self.rng.gen_range(0.0..5.0);

        (
            Pos::default(),
            Speed {
                x: angle.sin() * amplitude,
                y: angle.cos() * amplitude,
            },
            ParticleInfo { mass, lifetime },
        )
    }

    /// Inserts `amount` fresh particles.
    ///
    /// # Errors
    ///
    /// Propagates storage errors; particles inserted before the failure
    /// stay in the world.
    pub fn create_particles<R: Registry>(
        &mut self,
        world: &mut World<R>,
        amount: usize,
    ) -> SimResult<Vec<Entity>> {
        let mut handles = Vec::with_capacity(amount);
        for _ in 0..amount {
            let (pos, speed, info) = self.particle();
            handles.push(world.insert((pos, speed, info))?);
        }
        tracing::info!(amount, "spawned particles");
        Ok(handles)
    }

    /// Ages every particle by `dt` and respawns the expired ones in place.
    ///
    /// Returns the number of particles respawned.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn update<R: Registry>(&mut self, world: &mut World<R>, dt: f32) -> SimResult<usize> {
        let mut respawned = 0;
        for (pos, speed, info) in world.query::<(Pos, Speed, ParticleInfo)>()? {
            info.lifetime -= dt;
            if info.lifetime <= 0.0 {
                (*pos, *speed, *info) = self.particle();
                respawned += 1;
            }
        }
        Ok(respawned)
    }
}
