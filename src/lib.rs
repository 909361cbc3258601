//! Vector Rocks - wrap-around asteroids simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (polygons, wrap ghosts, collisions, game state)
//! - `config`: Data-driven game balance loaded from JSON
//! - `error`: Shape, configuration and session errors

pub mod config;
pub mod error;
pub mod sim;

pub use config::{AsteroidTier, Difficulty, GameConfig};
pub use error::{ConfigError, GameError, ShapeError};

/// Game configuration constants
pub mod consts {
    /// Default fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return angle;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
