//! # Particle Physics
//!
//! Explicit Euler integration under constant downward gravity, and the
//! screen-space projection a renderer would draw.

use strata_core::{Registry, World};

use crate::components::{ParticleInfo, Pos, Speed};
use crate::config::Viewport;
use crate::error::SimResult;

/// A projected particle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Pixels from the left edge.
    pub x: f32,
    /// Pixels from the top edge.
    pub y: f32,
}

/// Advances every particle by `dt` seconds.
///
/// `pos += speed * dt`, then `speed.y += gravity * dt / mass`.
///
/// # Errors
///
/// Propagates storage errors.
pub fn update_physics<R: Registry>(world: &mut World<R>, dt: f32, gravity: f32) -> SimResult<()> {
    for (pos, speed, info) in world.query::<(Pos, Speed, ParticleInfo)>()? {
        pos.x += speed.x * dt;
        pos.y += speed.y * dt;
        speed.y += gravity * dt / info.mass;
    }
    Ok(())
}

/// Projects every positioned record onto the viewport, origin at its
/// center. `points` is cleared first and reused.
///
/// # Errors
///
/// Propagates storage errors.
pub fn project_points<R: Registry>(
    world: &mut World<R>,
    viewport: Viewport,
    points: &mut Vec<Point>,
) -> SimResult<()> {
    let half_width = viewport.width / 2.0;
    let half_height = viewport.height / 2.0;

    points.clear();
    points.extend(world.query::<(Pos,)>()?.map(|(pos,)| Point {
        x: half_width + pos.x,
        y: half_height + pos.y,
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ParticleRegistry;

    fn world_with(pos: Pos, speed: Speed, mass: f32) -> World<ParticleRegistry> {
        let mut world = World::new();
        world
            .insert((pos, speed, ParticleInfo { mass, lifetime: 1.0 }))
            .unwrap();
        world
    }

    #[test]
    fn test_integration_step() {
        let mut world = world_with(Pos { x: 1.0, y: 2.0 }, Speed { x: 10.0, y: -4.0 }, 2.0);
        update_physics(&mut world, 0.5, 100.0).unwrap();

        let (pos, speed, _) = world
            .query::<(Pos, Speed, ParticleInfo)>()
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(*pos, Pos { x: 6.0, y: 0.0 });
        assert_eq!(*speed, Speed { x: 10.0, y: 21.0 });
    }

    #[test]
    fn test_heavier_particles_fall_slower() {
        let mut light = world_with(Pos::default(), Speed::default(), 1.0);
        let mut heavy = world_with(Pos::default(), Speed::default(), 10.0);
        for _ in 0..10 {
            update_physics(&mut light, 0.1, 100.0).unwrap();
            update_physics(&mut heavy, 0.1, 100.0).unwrap();
        }
        let light_y = light.query::<(Pos,)>().unwrap().next().unwrap().0.y;
        let heavy_y = heavy.query::<(Pos,)>().unwrap().next().unwrap().0.y;
        assert!(light_y > heavy_y);
        assert!(heavy_y > 0.0);
    }

    #[test]
    fn test_projection_centers_origin() {
        let mut world = world_with(Pos { x: -10.0, y: 5.0 }, Speed::default(), 1.0);
        world.insert((Pos { x: 0.0, y: 0.0 },)).unwrap();

        let mut points = vec![Point::default(); 7];
        let viewport = Viewport {
            width: 200.0,
            height: 100.0,
        };
        project_points(&mut world, viewport, &mut points).unwrap();
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(
            points,
            vec![Point { x: 90.0, y: 55.0 }, Point { x: 100.0, y: 50.0 }]
        );
    }
}
