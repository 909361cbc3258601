//! Polygon shapes and exact intersection tests
//!
//! A polygon keeps its outline in local coordinates plus a cached world-space
//! copy (`rotate(local, angle) + translation`) and bounding box. Pose changes
//! mark the cache dirty; `refresh` recomputes it once per tick.
//!
//! The default narrow phase is a separating-axis test over the edge normals of
//! both polygons. It is exact for convex outlines. Concave outlines (ship
//! silhouettes, jagged rocks) are effectively tested as their convex hull,
//! which is an accepted approximation for this game. `NarrowPhase::Crossing`
//! handles concave outlines exactly at a higher cost.

use std::borrow::Cow;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::error::ShapeError;

/// Edges shorter than this (squared) are considered zero-length
const MIN_EDGE_LENGTH_SQ: f32 = 1e-8;
/// Polygons with less area than this are considered collinear
const MIN_AREA: f32 = 1e-6;

/// Exact intersection algorithm used after the broad phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NarrowPhase {
    /// Separating-axis test over edge normals (convex-hull semantics)
    #[default]
    SeparatingAxis,
    /// Vertex containment + proper edge crossing (handles concave shapes)
    Crossing,
}

/// A validated simple polygon with a cached world-space pose
#[derive(Debug, Clone)]
pub struct Polygon {
    local: Vec<Vec2>,
    angle: f32,
    translation: Vec2,
    world: Vec<Vec2>,
    aabb: Aabb,
    dirty: bool,
}

impl Polygon {
    /// Build a polygon from local-space vertices.
    ///
    /// Rejects outlines with fewer than 3 vertices, zero-length edges,
    /// non-finite coordinates, zero area or crossing edges.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        let aabb = validate_outline(&vertices)?;
        Ok(Self {
            world: vertices.clone(),
            local: vertices,
            angle: 0.0,
            translation: Vec2::ZERO,
            aabb,
            dirty: false,
        })
    }

    /// Regular polygon centered on the local origin, first vertex at `phase`
    pub fn regular(radius: f32, sides: usize, phase: f32) -> Result<Self, ShapeError> {
        let step = std::f32::consts::TAU / sides.max(1) as f32;
        let vertices = (0..sides)
            .map(|i| Vec2::from_angle(phase + step * i as f32) * radius)
            .collect();
        Self::new(vertices)
    }

    pub fn local_vertices(&self) -> &[Vec2] {
        &self.local
    }

    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Set translation and rotation together
    pub fn set_pose(&mut self, translation: Vec2, angle: f32) {
        self.translation = translation;
        self.angle = angle;
        self.dirty = true;
    }

    /// True when the pose changed since the last `refresh`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recompute world vertices and bounding box after a pose change
    pub fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        let rotation = Vec2::from_angle(self.angle);
        self.world.clear();
        self.world
            .extend(self.local.iter().map(|v| rotation.rotate(*v) + self.translation));
        if let Some(aabb) = Aabb::from_points(&self.world) {
            self.aabb = aabb;
        }
        self.dirty = false;
    }

    /// World-space vertices.
    ///
    /// Reading a dirty cache is a programming error: it panics in debug
    /// builds and is recomputed on the fly in release builds.
    pub fn world_vertices(&self) -> Cow<'_, [Vec2]> {
        debug_assert!(!self.dirty, "polygon read before refresh() after a pose change");
        if self.dirty {
            Cow::Owned(self.transformed())
        } else {
            Cow::Borrowed(&self.world)
        }
    }

    /// World-space bounding box (same staleness policy as `world_vertices`)
    pub fn aabb(&self) -> Aabb {
        debug_assert!(!self.dirty, "bounding box read before refresh() after a pose change");
        if self.dirty {
            Aabb::from_points(&self.transformed()).unwrap_or(self.aabb)
        } else {
            self.aabb
        }
    }

    /// Whether the current world geometry is usable for collision
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite()
            && self.angle.is_finite()
            && self.world_vertices().iter().all(|v| v.is_finite())
    }

    fn transformed(&self) -> Vec<Vec2> {
        let rotation = Vec2::from_angle(self.angle);
        self.local
            .iter()
            .map(|v| rotation.rotate(*v) + self.translation)
            .collect()
    }
}

/// Twice the signed area (positive for counter-clockwise winding)
pub fn signed_area_2x(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    (0..n)
        .map(|i| vertices[i].perp_dot(vertices[(i + 1) % n]))
        .sum()
}

/// Orientation of three points: > 0 left turn, 0 collinear, < 0 right turn
#[inline]
pub fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (a - c).perp_dot(b - c)
}

/// Closed segment intersection (touching endpoints count)
pub fn segments_touch(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> bool {
    let boxes_overlap = p0.x.max(p1.x) >= p2.x.min(p3.x)
        && p2.x.max(p3.x) >= p0.x.min(p1.x)
        && p0.y.max(p1.y) >= p2.y.min(p3.y)
        && p2.y.max(p3.y) >= p0.y.min(p1.y);
    boxes_overlap
        && orientation(p0, p2, p3) * orientation(p1, p2, p3) <= 0.0
        && orientation(p2, p0, p1) * orientation(p3, p0, p1) <= 0.0
}

/// Proper segment crossing (the segments cut through each other)
fn segments_cross(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> bool {
    orientation(p0, p2, p3) * orientation(p1, p2, p3) < 0.0
        && orientation(p2, p0, p1) * orientation(p3, p0, p1) < 0.0
}

/// Check an outline and return its bounding box
fn validate_outline(vertices: &[Vec2]) -> Result<Aabb, ShapeError> {
    let n = vertices.len();
    let Some(aabb) = Aabb::from_points(vertices).filter(|_| n >= 3) else {
        return Err(ShapeError::TooFewVertices(n));
    };
    if let Some(i) = vertices.iter().position(|v| !v.is_finite()) {
        return Err(ShapeError::NonFiniteVertex(i));
    }
    for i in 0..n {
        let next = (i + 1) % n;
        if vertices[i].distance_squared(vertices[next]) <= MIN_EDGE_LENGTH_SQ {
            return Err(ShapeError::DegenerateEdge { from: i, to: next });
        }
    }
    if signed_area_2x(vertices).abs() * 0.5 <= MIN_AREA {
        return Err(ShapeError::ZeroArea);
    }
    // Edge i runs from vertex i to vertex i + 1
    for first in 0..n {
        for second in (first + 2)..n {
            if first == 0 && second == n - 1 {
                continue;
            }
            if segments_touch(
                vertices[first],
                vertices[(first + 1) % n],
                vertices[second],
                vertices[(second + 1) % n],
            ) {
                return Err(ShapeError::SelfIntersecting { first, second });
            }
        }
    }
    Ok(aabb)
}

/// Exact overlap of two world-space outlines, each shifted by a ghost offset.
///
/// Touching outlines (zero separation) do not overlap.
pub fn intersects(
    a: &[Vec2],
    a_offset: Vec2,
    b: &[Vec2],
    b_offset: Vec2,
    mode: NarrowPhase,
) -> bool {
    match mode {
        NarrowPhase::SeparatingAxis => {
            !has_separating_axis(a, a, a_offset, b, b_offset)
                && !has_separating_axis(b, a, a_offset, b, b_offset)
        }
        NarrowPhase::Crossing => crossing_overlap(a, a_offset, b, b_offset),
    }
}

/// Projection interval of `vertices + offset` onto `axis`
#[inline]
fn project(vertices: &[Vec2], offset: Vec2, axis: Vec2) -> (f32, f32) {
    let shift = offset.dot(axis);
    let (min, max) = vertices
        .iter()
        .map(|v| v.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), d| {
            (min.min(d), max.max(d))
        });
    (min + shift, max + shift)
}

/// Check the normals of `edges_of` as candidate separating axes
fn has_separating_axis(
    edges_of: &[Vec2],
    a: &[Vec2],
    a_offset: Vec2,
    b: &[Vec2],
    b_offset: Vec2,
) -> bool {
    let n = edges_of.len();
    (0..n).any(|i| {
        let edge = edges_of[(i + 1) % n] - edges_of[i];
        let axis = edge.perp();
        let (a_min, a_max) = project(a, a_offset, axis);
        let (b_min, b_max) = project(b, b_offset, axis);
        a_max <= b_min || b_max <= a_min
    })
}

/// Ray-crossing point-in-polygon; boundary points are unspecified
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let mut prev = match polygon.last() {
        Some(v) => *v,
        None => return false,
    };
    for &curr in polygon {
        if (curr.y > point.y) != (prev.y > point.y)
            && point.x < (prev.x - curr.x) * (point.y - curr.y) / (prev.y - curr.y) + curr.x
        {
            inside = !inside;
        }
        prev = curr;
    }
    inside
}

fn crossing_overlap(a: &[Vec2], a_offset: Vec2, b: &[Vec2], b_offset: Vec2) -> bool {
    let delta = b_offset - a_offset;

    // Work in A's frame: B is shifted by `delta`
    if a.iter().any(|v| point_in_polygon(*v - delta, b)) {
        return true;
    }
    if b.iter().any(|v| point_in_polygon(*v + delta, a)) {
        return true;
    }

    let (na, nb) = (a.len(), b.len());
    (0..na).any(|i| {
        let (p0, p1) = (a[i], a[(i + 1) % na]);
        (0..nb).any(|j| segments_cross(p0, p1, b[j] + delta, b[(j + 1) % nb] + delta))
    })
}
