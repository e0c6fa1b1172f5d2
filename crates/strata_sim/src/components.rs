//! # Particle Components

use bytemuck::{Pod, Zeroable};
use strata_core::{Component, StaticRegistry};

/// Position in world space, relative to the viewport center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Pos {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate, growing downwards.
    pub y: f32,
}

impl Component for Pos {}

/// Velocity in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Speed {
    /// Horizontal velocity.
    pub x: f32,
    /// Vertical velocity.
    pub y: f32,
}

impl Component for Speed {}

/// Per-particle physical properties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ParticleInfo {
    /// Divides the gravity acceleration.
    pub mass: f32,
    /// Seconds until the particle is recycled.
    pub lifetime: f32,
}

impl Component for ParticleInfo {}

/// Closed registry over the particle components.
pub type ParticleRegistry = StaticRegistry<(Pos, Speed, ParticleInfo)>;
