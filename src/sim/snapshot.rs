//! Read-only frame snapshot for renderers
//!
//! Ghost offsets come from the same wrap resolver the collision engine uses,
//! so what is drawn at a screen edge is exactly what can be hit there.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::KindTag;
use super::state::{GamePhase, GameState};
use super::wrap::World;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: u32,
    pub kind: KindTag,
    pub position: Vec2,
    pub heading: f32,
    /// World-space outline
    pub vertices: Vec<Vec2>,
    /// Offsets to draw the outline at (identity first)
    pub ghosts: Vec<Vec2>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebrisSnapshot {
    pub position: Vec2,
    /// 1.0 when spawned, 0.0 when about to vanish
    pub fade: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub world: World,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub show_fps: bool,
    pub entities: Vec<EntitySnapshot>,
    pub debris: Vec<DebrisSnapshot>,
}

impl GameState {
    /// Capture everything a renderer needs for this frame
    pub fn snapshot(&self) -> RenderSnapshot {
        let entities = self
            .entities
            .iter()
            .filter(|e| e.alive)
            .map(|e| EntitySnapshot {
                id: e.id,
                kind: e.tag(),
                position: e.pose.position,
                heading: e.pose.heading,
                vertices: e.shape.world_vertices().into_owned(),
                ghosts: self.world.ghost_offsets(&e.shape.aabb()).as_slice().to_vec(),
            })
            .collect();

        let debris = self
            .debris
            .iter()
            .map(|d| DebrisSnapshot {
                position: d.pos,
                fade: if d.max_life > 0.0 {
                    (d.life / d.max_life).clamp(0.0, 1.0)
                } else {
                    0.0
                },
            })
            .collect();

        RenderSnapshot {
            tick: self.time_ticks,
            phase: self.phase,
            world: self.world,
            score: self.score,
            lives: self.lives,
            level: self.level,
            show_fps: self.show_fps,
            entities,
            debris,
        }
    }
}
