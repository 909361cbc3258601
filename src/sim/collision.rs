//! Per-frame collision queries
//!
//! Every unordered pair of interacting entities is tested against every
//! combination of their wrap ghosts: bounding boxes first, then the exact
//! polygon test. A pair is reported at most once per frame.

use std::borrow::Cow;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::entity::{Entity, KindTag};
use super::polygon::{NarrowPhase, intersects};
use super::wrap::{GhostSet, World};

/// Which kind pairs can collide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionRules {
    pub ship_asteroid: bool,
    pub bullet_asteroid: bool,
    pub asteroid_asteroid: bool,
}

impl Default for CollisionRules {
    fn default() -> Self {
        Self {
            ship_asteroid: true,
            bullet_asteroid: true,
            asteroid_asteroid: false,
        }
    }
}

impl CollisionRules {
    /// Bullets never hit the ship, and ships/bullets never hit their own kind
    pub fn interacts(&self, a: KindTag, b: KindTag) -> bool {
        use KindTag::*;
        match (a, b) {
            (Ship, Asteroid) | (Asteroid, Ship) => self.ship_asteroid,
            (Bullet, Asteroid) | (Asteroid, Bullet) => self.bullet_asteroid,
            (Asteroid, Asteroid) => self.asteroid_asteroid,
            _ => false,
        }
    }
}

/// Two entities that overlapped this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Earlier-spawned entity
    pub first: u32,
    /// Later-spawned entity
    pub second: u32,
    /// Ghost offset of `first` that produced the hit
    pub first_offset: Vec2,
    /// Ghost offset of `second` that produced the hit
    pub second_offset: Vec2,
}

impl CollisionEvent {
    pub fn involves(&self, id: u32) -> bool {
        self.first == id || self.second == id
    }
}

/// Per-entity data gathered once per frame
struct Candidate<'a> {
    entity: &'a Entity,
    vertices: Cow<'a, [Vec2]>,
    aabb: Aabb,
    ghosts: GhostSet,
}

/// Collect every overlapping pair among the live entities.
///
/// Entities must be in spawn order for events to come out deterministically.
/// Dead entities are ignored; entities with non-finite geometry are skipped
/// with a warning. Fragments of the same split never collide with each other.
pub fn detect_collisions(
    entities: &[Entity],
    world: &World,
    rules: &CollisionRules,
    mode: NarrowPhase,
) -> Vec<CollisionEvent> {
    let candidates: Vec<Candidate<'_>> = entities
        .iter()
        .filter(|e| e.alive)
        .filter_map(|entity| {
            if !entity.shape.is_finite() {
                log::warn!(
                    "Skipping entity {} ({:?}): non-finite geometry",
                    entity.id,
                    entity.tag()
                );
                return None;
            }
            let aabb = entity.shape.aabb();
            Some(Candidate {
                entity,
                vertices: entity.shape.world_vertices(),
                aabb,
                ghosts: world.ghost_offsets(&aabb),
            })
        })
        .collect();

    let mut events = Vec::new();
    for (i, a) in candidates.iter().enumerate() {
        for b in &candidates[i + 1..] {
            if !rules.interacts(a.entity.tag(), b.entity.tag()) || a.entity.same_brood(b.entity) {
                continue;
            }
            if let Some(event) = test_pair(a, b, mode) {
                log::debug!(
                    "Collision {:?} {} <-> {:?} {}",
                    a.entity.tag(),
                    event.first,
                    b.entity.tag(),
                    event.second
                );
                events.push(event);
            }
        }
    }
    events
}

/// First overlapping ghost combination for a pair, if any
fn test_pair(a: &Candidate<'_>, b: &Candidate<'_>, mode: NarrowPhase) -> Option<CollisionEvent> {
    for a_offset in a.ghosts.iter() {
        let a_box = a.aabb.translated(a_offset);
        for b_offset in b.ghosts.iter() {
            if !a_box.overlaps(&b.aabb.translated(b_offset)) {
                continue;
            }
            if intersects(&a.vertices, a_offset, &b.vertices, b_offset, mode) {
                return Some(CollisionEvent {
                    first: a.entity.id,
                    second: b.entity.id,
                    first_offset: a_offset,
                    second_offset: b_offset,
                });
            }
        }
    }
    None
}
