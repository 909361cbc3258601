//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod collision;
pub mod entity;
pub mod polygon;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod wrap;

pub use aabb::Aabb;
pub use collision::{CollisionEvent, CollisionRules, detect_collisions};
pub use entity::{Entity, EntityKind, KindTag, Pose};
pub use polygon::{NarrowPhase, Polygon, intersects};
pub use snapshot::{DebrisSnapshot, EntitySnapshot, RenderSnapshot};
pub use state::{Debris, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, start_next_level, tick};
pub use wrap::{GhostSet, World, ghost_offsets, ghost_positions};
