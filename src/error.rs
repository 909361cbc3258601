//! Error types
//!
//! Shape validation happens once, when a polygon is built. The per-tick
//! simulation path never returns errors.

use thiserror::Error;

/// A polygon outline that cannot be used for collision
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Fewer than three vertices
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Two consecutive vertices coincide (includes the closing edge)
    #[error("zero-length edge between vertex {from} and vertex {to}")]
    DegenerateEdge { from: usize, to: usize },

    /// NaN or infinite coordinate
    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteVertex(usize),

    /// All vertices collinear
    #[error("polygon has zero area")]
    ZeroArea,

    /// Two non-adjacent edges cross each other
    #[error("edges {first} and {second} intersect")]
    SelfIntersecting { first: usize, second: usize },
}

/// Failure to load or validate a game configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failure to start or extend a game session
#[derive(Error, Debug)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Requested asteroid tier is not configured
    #[error("no asteroid tier {0} configured")]
    UnknownTier(usize),
}
