//! Game session state
//!
//! Everything a running game needs lives in `GameState`, which is owned by
//! the caller and passed to `tick` by mutable reference.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionEvent;
use super::entity::{
    Entity, EntityKind, KindTag, Pose, asteroid_shape, bullet_shape, random_direction, ship_shape,
};
use super::polygon::Polygon;
use super::wrap::World;
use crate::config::GameConfig;
use crate::error::{GameError, ShapeError};

/// Maximum debris particles
pub const MAX_DEBRIS: usize = 256;
/// Score ceiling
pub const MAX_SCORE: u64 = 99_999_999;

/// Top-level state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation advances every tick
    Running,
    /// Update phase suspended; snapshots still available
    Paused,
    /// No lives left; asteroids keep drifting
    GameOver,
}

/// Notifications for audio, score and HUD collaborators.
///
/// Rebuilt every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Collision(CollisionEvent),
    BulletFired { id: u32 },
    BulletExpired { id: u32 },
    AsteroidDestroyed { id: u32, tier: usize, position: Vec2, points: u64 },
    AsteroidSplit { parent: u32, children: Vec<u32> },
    ShipHit { id: u32, hull_left: u8 },
    ShipDestroyed { id: u32, lives_left: u32 },
    ShipRespawned { id: u32 },
    LevelStarted { level: u32, asteroids: usize },
    GameOver { score: u64 },
}

/// Cosmetic fragment; never collides
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
}

/// A running game session
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub world: World,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub level: u32,
    pub lives: u32,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub show_fps: bool,
    /// Ticks until the ship reappears (None while alive or game over)
    pub respawn_ticks: Option<u32>,
    /// Live entities, sorted by id (spawn order)
    pub entities: Vec<Entity>,
    pub debris: Vec<Debris>,
    /// Events produced by the most recent tick
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Start a new session with the ship at the world center.
    ///
    /// The config is validated first; the per-tick path relies on it.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        let mut state = Self {
            world: config.world(),
            lives: config.starting_lives,
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 0,
            score: 0,
            time_ticks: 0,
            phase: GamePhase::Running,
            show_fps: false,
            respawn_ticks: None,
            entities: Vec::new(),
            debris: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };
        state.spawn_ship()?;
        log::info!(
            "New game: seed={}, world={}x{}",
            seed,
            state.world.width,
            state.world.height
        );
        Ok(state)
    }

    /// Throw away the session and start over with the same config and seed
    pub fn reset(&mut self) -> Result<(), GameError> {
        *self = Self::new(self.config.clone(), self.seed)?;
        Ok(())
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    /// Position of an entity in `entities` (sorted by id)
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    pub fn ship(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag() == KindTag::Ship && e.alive)
    }

    pub fn ship_mut(&mut self) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|e| e.tag() == KindTag::Ship && e.alive)
    }

    pub fn count(&self, tag: KindTag) -> usize {
        self.entities
            .iter()
            .filter(|e| e.alive && e.tag() == tag)
            .count()
    }

    /// Add an entity with a caller-supplied shape
    pub fn spawn_entity(&mut self, kind: EntityKind, pose: Pose, shape: Polygon) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(Entity::new(id, kind, pose, shape));
        log::debug!("Spawned {:?} {} at {:?}", kind.tag(), id, pose.position);
        id
    }

    /// Place a fresh ship at the world center
    pub fn spawn_ship(&mut self) -> Result<u32, ShapeError> {
        let shape = ship_shape()?;
        let hull = self.config.difficulty.ship_hull();
        let pose = Pose::at(self.world.center());
        Ok(self.spawn_entity(EntityKind::Ship { hull }, pose, shape))
    }

    pub fn spawn_bullet(
        &mut self,
        position: Vec2,
        heading: f32,
        velocity: Vec2,
        lifetime_ticks: u32,
    ) -> Result<u32, ShapeError> {
        let shape = bullet_shape()?;
        let pose = Pose {
            position: self.world.wrap(position),
            heading,
            velocity,
            angular_velocity: 0.0,
        };
        Ok(self.spawn_entity(
            EntityKind::Bullet {
                ticks_left: lifetime_ticks,
            },
            pose,
            shape,
        ))
    }

    /// Spawn an asteroid of the given tier with a random outline
    pub fn spawn_asteroid(&mut self, tier: usize, pose: Pose) -> Result<u32, GameError> {
        self.spawn_rock(tier, pose, None)
    }

    /// Spawn a split fragment. Fragments sharing a brood never collide with
    /// each other.
    pub fn spawn_fragment(&mut self, tier: usize, pose: Pose, brood: u32) -> Result<u32, GameError> {
        self.spawn_rock(tier, pose, Some(brood))
    }

    fn spawn_rock(&mut self, tier: usize, pose: Pose, brood: Option<u32>) -> Result<u32, GameError> {
        let tier = tier.min(self.config.top_tier());
        let (radius, vertices) = self
            .config
            .asteroid_tiers
            .get(tier)
            .map(|t| (t.radius, t.vertices))
            .ok_or(GameError::UnknownTier(tier))?;
        let shape = asteroid_shape(&mut self.rng, radius, vertices)?;
        let id = self.spawn_entity(EntityKind::Asteroid { tier }, pose, shape);
        if let Some(index) = self.index_of(id) {
            self.entities[index].brood = brood;
        }
        Ok(id)
    }

    /// Scatter `count` debris fragments within `radius` of `center`
    pub fn spawn_debris(&mut self, center: Vec2, radius: f32, count: usize, speed: f32) {
        let room = MAX_DEBRIS.saturating_sub(self.debris.len());
        for _ in 0..count.min(room) {
            let dir = random_direction(&mut self.rng);
            let dist = self.rng.random_range(radius * 0.25..=radius);
            let spread = self.rng.random_range(-0.26f32..=0.26);
            let speed = speed * self.rng.random_range(0.3f32..=1.0);
            let life = self.rng.random_range(1.6f32..=3.3);
            self.debris.push(Debris {
                pos: self.world.wrap(center + dir * dist),
                vel: Vec2::from_angle(spread).rotate(dir) * speed,
                life,
                max_life: life,
            });
        }
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points).min(MAX_SCORE);
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }
}
