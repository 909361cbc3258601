//! Game configuration
//!
//! Loaded from a JSON file; every field has a default so partial files work.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::NarrowPhase;
use crate::sim::wrap::World;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    /// Ship survives several hits per life
    Casual,
    /// One hit destroys the ship
    #[default]
    Arcade,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Casual => "Casual",
            Difficulty::Arcade => "Arcade",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "casual" | "easy" => Some(Difficulty::Casual),
            "arcade" | "classic" => Some(Difficulty::Arcade),
            _ => None,
        }
    }

    /// Hits a ship absorbs before it is destroyed
    pub fn ship_hull(&self) -> u8 {
        match self {
            Difficulty::Casual => 3,
            Difficulty::Arcade => 1,
        }
    }
}

/// One asteroid size level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsteroidTier {
    /// Mean outline radius
    pub radius: f32,
    /// Outline vertex count
    pub vertices: usize,
    /// Score for destroying an asteroid of this tier
    pub points: u64,
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Fixed integration interval (seconds)
    pub timestep: f32,

    // === Asteroids ===
    /// Size levels, smallest first
    pub asteroid_tiers: Vec<AsteroidTier>,
    /// Fragments spawned when a non-minimum tier asteroid is destroyed
    pub children_per_split: usize,
    pub asteroid_min_speed: f32,
    pub asteroid_max_speed: f32,
    /// Extra speed per level
    pub asteroid_speed_per_level: f32,
    /// Maximum spin (radians per second)
    pub asteroid_max_spin: f32,
    /// Let asteroids destroy each other on contact
    pub asteroid_asteroid_collisions: bool,
    /// Level cap (a level spawns this many asteroids)
    pub max_level: u32,

    // === Ship ===
    pub difficulty: Difficulty,
    pub starting_lives: u32,
    pub respawn_delay_ticks: u32,
    /// Radians per second
    pub ship_turn_rate: f32,
    /// Acceleration (pixels/s²)
    pub ship_thrust: f32,
    pub ship_max_speed: f32,

    // === Bullets ===
    /// Maximum live bullets
    pub shot_limit: usize,
    pub bullet_speed: f32,
    pub bullet_lifetime_ticks: u32,

    // === Collision ===
    pub narrow_phase: NarrowPhase,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: 1024.0,
            world_height: 768.0,
            timestep: crate::consts::SIM_DT,

            asteroid_tiers: vec![
                AsteroidTier {
                    radius: 12.0,
                    vertices: 7,
                    points: 100,
                },
                AsteroidTier {
                    radius: 25.0,
                    vertices: 9,
                    points: 50,
                },
                AsteroidTier {
                    radius: 50.0,
                    vertices: 11,
                    points: 20,
                },
            ],
            children_per_split: 2,
            asteroid_min_speed: 0.6,
            asteroid_max_speed: 60.0,
            asteroid_speed_per_level: 6.0,
            asteroid_max_spin: 1.05,
            asteroid_asteroid_collisions: false,
            max_level: 9,

            difficulty: Difficulty::Arcade,
            starting_lives: 3,
            respawn_delay_ticks: 120,
            ship_turn_rate: std::f32::consts::FRAC_PI_2,
            ship_thrust: 360.0,
            ship_max_speed: 900.0,

            shot_limit: 10,
            bullet_speed: 360.0,
            bullet_lifetime_ticks: 103,

            narrow_phase: NarrowPhase::SeparatingAxis,
        }
    }
}

impl GameConfig {
    /// Create a config from a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn world(&self) -> World {
        World::new(self.world_width, self.world_height)
    }

    /// Largest tier index
    pub fn top_tier(&self) -> usize {
        self.asteroid_tiers.len().saturating_sub(1)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        };
        let non_negative = |name: &str, value: f32| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )))
            }
        };
        positive("world_width", self.world_width)?;
        positive("world_height", self.world_height)?;
        positive("timestep", self.timestep)?;
        positive("bullet_speed", self.bullet_speed)?;
        non_negative("asteroid_min_speed", self.asteroid_min_speed)?;
        non_negative("asteroid_max_speed", self.asteroid_max_speed)?;
        non_negative("asteroid_speed_per_level", self.asteroid_speed_per_level)?;
        non_negative("asteroid_max_spin", self.asteroid_max_spin)?;
        non_negative("ship_turn_rate", self.ship_turn_rate)?;
        non_negative("ship_thrust", self.ship_thrust)?;
        non_negative("ship_max_speed", self.ship_max_speed)?;

        if self.asteroid_tiers.is_empty() {
            return Err(ConfigError::Invalid("asteroid_tiers must not be empty".into()));
        }
        for (index, tier) in self.asteroid_tiers.iter().enumerate() {
            if !(tier.radius.is_finite() && tier.radius > 0.0) || tier.vertices < 3 {
                return Err(ConfigError::Invalid(format!(
                    "asteroid tier {index} needs a positive radius and at least 3 vertices"
                )));
            }
        }
        if self.asteroid_min_speed > self.asteroid_max_speed {
            return Err(ConfigError::Invalid(
                "asteroid speed range must satisfy min <= max".into(),
            ));
        }
        if self.bullet_lifetime_ticks == 0 {
            return Err(ConfigError::Invalid("bullet_lifetime_ticks must be at least 1".into()));
        }
        if self.max_level == 0 {
            return Err(ConfigError::Invalid("max_level must be at least 1".into()));
        }
        Ok(())
    }
}
