//! Toroidal world and wrap ghosts
//!
//! Objects leaving one edge reappear on the opposite edge. Rather than using
//! wrap-aware distances, an object whose bounding box straddles an edge is
//! also considered to exist at "ghost" copies shifted by the world size. The
//! same ghost set drives collision and rendering duplication.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;

/// Maximum ghosts per object: identity, horizontal, vertical, diagonal
pub const MAX_GHOSTS: usize = 4;

/// Fixed world bounds `[0, width) x [0, height)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
}

impl World {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Floor-wrap a position into the world (never clamps)
    #[inline]
    pub fn wrap(&self, pos: Vec2) -> Vec2 {
        Vec2::new(wrap_scalar(pos.x, self.width), wrap_scalar(pos.y, self.height))
    }

    /// Ghost offsets for a world-space bounding box
    pub fn ghost_offsets(&self, aabb: &Aabb) -> GhostSet {
        ghost_offsets(aabb, self)
    }
}

/// Floor-wrap `value` into `[0, length)`
#[inline]
pub fn wrap_scalar(value: f32, length: f32) -> f32 {
    let wrapped = value - length * (value / length).floor();
    // Rounding can land exactly on `length` for tiny negative inputs
    if wrapped >= length { 0.0 } else { wrapped }
}

/// Up to four offsets, identity first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostSet {
    offsets: [Vec2; MAX_GHOSTS],
    len: usize,
}

impl GhostSet {
    fn identity() -> Self {
        Self {
            offsets: [Vec2::ZERO; MAX_GHOSTS],
            len: 1,
        }
    }

    fn push(&mut self, offset: Vec2) {
        if self.len < MAX_GHOSTS {
            self.offsets[self.len] = offset;
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Never true: the identity offset is always present
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Vec2] {
        &self.offsets[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.as_slice().iter().copied()
    }

    /// Offsets applied to a base position
    pub fn positions(&self, base: Vec2) -> Vec<Vec2> {
        self.iter().map(|offset| base + offset).collect()
    }
}

/// Offsets at which an object with this box must also be considered.
///
/// A box straddles an axis when it extends below 0 or past the axis length.
/// The low edge wins when a box is larger than the world.
pub fn ghost_offsets(aabb: &Aabb, world: &World) -> GhostSet {
    let dx = if aabb.min.x < 0.0 {
        world.width
    } else if aabb.max.x > world.width {
        -world.width
    } else {
        0.0
    };
    let dy = if aabb.min.y < 0.0 {
        world.height
    } else if aabb.max.y > world.height {
        -world.height
    } else {
        0.0
    };

    let mut ghosts = GhostSet::identity();
    if dx != 0.0 {
        ghosts.push(Vec2::new(dx, 0.0));
    }
    if dy != 0.0 {
        ghosts.push(Vec2::new(0.0, dy));
    }
    if dx != 0.0 && dy != 0.0 {
        ghosts.push(Vec2::new(dx, dy));
    }
    ghosts
}

/// Ghost positions for an object at `position` with the given half-size
pub fn ghost_positions(position: Vec2, half_extent: Vec2, world: &World) -> Vec<Vec2> {
    ghost_offsets(&Aabb::from_center(position, half_extent), world).positions(position)
}
