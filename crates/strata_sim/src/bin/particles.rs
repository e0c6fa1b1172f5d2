//! # STRATA Particles
//!
//! Headless particle run.
//!
//! ```bash
//! # Default scenario: 16384 particles, 600 frames
//! strata-particles
//!
//! # Custom scenario, per-frame timings
//! RUST_LOG=debug strata-particles scenario.toml
//! ```

use std::process::ExitCode;
use std::time::Duration;

use strata_core::{ecs::DEFAULT_REGISTRY_CAPACITY, DynamicRegistry, Registry};
use strata_sim::components::ParticleRegistry;
use strata_sim::{FrameTimings, RegistryKind, SimConfig, SimResult, Simulation};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> SimResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(%path, "loading scenario");
            SimConfig::load(path)?
        }
        None => SimConfig::default(),
    };

    tracing::info!(
        particles = config.particle_count,
        frames = config.frames,
        dt = config.dt,
        registry = ?config.registry,
        "starting simulation"
    );

    match config.registry {
        RegistryKind::Dynamic => run_frames::<DynamicRegistry<DEFAULT_REGISTRY_CAPACITY>>(config),
        RegistryKind::Static => run_frames::<ParticleRegistry>(config),
    }
}

fn run_frames<R: Registry + Default>(config: SimConfig) -> SimResult<()> {
    let frames = config.frames;
    let mut sim = Simulation::<R>::new(config)?;

    let mut total = FrameTimings::default();
    let mut respawned = 0;
    for frame in 0..frames {
        let report = sim.step()?;
        tracing::debug!(
            frame,
            update_physics = ?report.timings.physics,
            update_particles = ?report.timings.particles,
            draw = ?report.timings.draw,
            respawned = report.respawned,
            "frame"
        );
        total.physics += report.timings.physics;
        total.particles += report.timings.particles;
        total.draw += report.timings.draw;
        respawned += report.respawned;
    }

    let average = |d: Duration| d.checked_div(frames).unwrap_or_default();
    tracing::info!(
        frames,
        respawned,
        live = sim.world().len(),
        archetypes = sim.world().archetypes().len(),
        update_physics = ?average(total.physics),
        update_particles = ?average(total.particles),
        draw = ?average(total.draw),
        frame = ?average(total.total()),
        "simulation finished (average per frame)"
    );
    Ok(())
}
