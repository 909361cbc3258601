//! Ships, asteroids and bullets
//!
//! Every entity owns a validated polygon and a pose. Outlines use screen
//! coordinates (y grows downward) with the nose along local -y.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::polygon::Polygon;
use super::wrap::World;
use crate::error::ShapeError;
use crate::normalize_angle;

/// Ship outline: wings at (+-10, 5), nose at (0, -20)
pub const SHIP_OUTLINE: [Vec2; 3] = [
    Vec2::new(10.0, 5.0),
    Vec2::new(0.0, -20.0),
    Vec2::new(-10.0, 5.0),
];
/// Index of the nose vertex in `SHIP_OUTLINE`
pub const SHIP_NOSE: usize = 1;
/// Bullet outline, pointing along local -y
pub const BULLET_OUTLINE: [Vec2; 3] = [
    Vec2::new(-1.5, 0.0),
    Vec2::new(1.5, 0.0),
    Vec2::new(0.0, -7.0),
];
/// Asteroid vertex radius jitter (fraction of the mean radius)
const RADIUS_JITTER: f32 = 0.3;
/// Asteroid vertex angle jitter (fraction of the mean angular step)
const ANGLE_JITTER: f32 = 0.2;

/// Position, heading and their rates of change
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    /// Radians, normalized to [-π, π)
    pub heading: f32,
    pub velocity: Vec2,
    /// Radians per second
    pub angular_velocity: f32,
}

impl Pose {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Unit vector the nose points along
    #[inline]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading).rotate(Vec2::NEG_Y)
    }

    /// Advance by `dt` seconds and wrap into the world
    pub fn integrate(&mut self, dt: f32, world: &World) {
        self.position = world.wrap(self.position + self.velocity * dt);
        self.heading = normalize_angle(self.heading + self.angular_velocity * dt);
    }
}

/// Per-kind state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Player ship; `hull` hits remaining before it is destroyed
    Ship { hull: u8 },
    /// Asteroid at a size tier (0 = smallest)
    Asteroid { tier: usize },
    /// Bullet with remaining lifetime in ticks
    Bullet { ticks_left: u32 },
}

/// Kind without state, used for pair rules and snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindTag {
    Ship,
    Asteroid,
    Bullet,
}

impl EntityKind {
    pub fn tag(&self) -> KindTag {
        match self {
            EntityKind::Ship { .. } => KindTag::Ship,
            EntityKind::Asteroid { .. } => KindTag::Asteroid,
            EntityKind::Bullet { .. } => KindTag::Bullet,
        }
    }
}

/// A live simulation object
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pose: Pose,
    pub shape: Polygon,
    pub alive: bool,
    /// Split that produced this fragment (None for original rocks)
    pub brood: Option<u32>,
}

impl Entity {
    /// Create an entity and bring its polygon up to date with the pose
    pub fn new(id: u32, kind: EntityKind, pose: Pose, mut shape: Polygon) -> Self {
        shape.set_pose(pose.position, pose.heading);
        shape.refresh();
        Self {
            id,
            kind,
            pose,
            shape,
            alive: true,
            brood: None,
        }
    }

    #[inline]
    pub fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    /// Integrate the pose and refresh the world-space polygon
    pub fn integrate(&mut self, dt: f32, world: &World) {
        self.pose.integrate(dt, world);
        self.sync_shape();
    }

    /// Push the current pose into the polygon cache
    pub fn sync_shape(&mut self) {
        self.shape.set_pose(self.pose.position, self.pose.heading);
        self.shape.refresh();
    }

    /// Fragments of the same split
    pub fn same_brood(&self, other: &Entity) -> bool {
        self.brood.is_some() && self.brood == other.brood
    }

    /// Count down a bullet's lifetime. Returns true when it just expired.
    pub fn tick_lifetime(&mut self) -> bool {
        match &mut self.kind {
            EntityKind::Bullet { ticks_left } => {
                *ticks_left = ticks_left.saturating_sub(1);
                if *ticks_left == 0 {
                    self.alive = false;
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// World position of the ship's nose (the pose position for other kinds)
    pub fn nose_position(&self) -> Vec2 {
        match self.kind {
            EntityKind::Ship { .. } => {
                Vec2::from_angle(self.pose.heading).rotate(SHIP_OUTLINE[SHIP_NOSE])
                    + self.pose.position
            }
            _ => self.pose.position,
        }
    }
}

pub fn ship_shape() -> Result<Polygon, ShapeError> {
    Polygon::new(SHIP_OUTLINE.to_vec())
}

pub fn bullet_shape() -> Result<Polygon, ShapeError> {
    Polygon::new(BULLET_OUTLINE.to_vec())
}

/// Random rock outline: points on a perturbed circle.
///
/// Each vertex stays within its own angular slot, so the outline is
/// star-shaped around the origin and never self-intersects.
pub fn asteroid_shape<R: Rng>(
    rng: &mut R,
    radius: f32,
    vertex_count: usize,
) -> Result<Polygon, ShapeError> {
    let step = std::f32::consts::TAU / vertex_count.max(1) as f32;
    let vertices = (0..vertex_count)
        .map(|i| {
            let angle = step * i as f32 + rng.random_range(-ANGLE_JITTER..=ANGLE_JITTER) * step;
            let r = radius * (1.0 + rng.random_range(-RADIUS_JITTER..=RADIUS_JITTER));
            Vec2::from_angle(angle).rotate(Vec2::Y) * r
        })
        .collect();
    Polygon::new(vertices)
}

/// Random unit direction
pub fn random_direction<R: Rng>(rng: &mut R) -> Vec2 {
    Vec2::from_angle(rng.random_range(-std::f32::consts::PI..std::f32::consts::PI))
}
