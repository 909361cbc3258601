//! Axis-aligned bounding boxes for broad-phase rejection

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box, `min <= max` on both axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Tightest box around a set of points.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    /// Box centered on `center` extending `half_extent` on each side
    pub fn from_center(center: Vec2, half_extent: Vec2) -> Self {
        let half_extent = half_extent.abs();
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Standard AABB overlap: projections overlap on both axes
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Copy of this box shifted by `offset`
    #[inline]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
