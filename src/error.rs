//! Error types for the game core.
//!
//! Only startup configuration and file I/O surface as `Err`. Everything that
//! happens during play (blocked moves, missing paths, sparse spawns, taken
//! leaderboard names) is an ordinary return value.

use std::io;

/// Umbrella error for construction and persistence.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Leaderboard error: {0}")]
    Leaderboard(#[from] LeaderboardError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Invalid simulation configuration, fatal at initialization.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Map size too small: {width}x{height} (minimum {min}x{min})")]
    GridTooSmall { width: i32, height: i32, min: i32 },

    #[error("Player spawn ({x}, {y}) is not inside the grid interior")]
    InvalidSpawn { x: i32, y: i32 },

    #[error("Player spawn ({x}, {y}) is on an indestructible pillar")]
    SpawnOnPillar { x: i32, y: i32 },

    #[error("Destructible wall density {0} is outside [0, 1]")]
    InvalidDensity(f64),

    #[error("Power-up drop chance {0} is outside [0, 1]")]
    InvalidDropChance(f32),
}

#[derive(thiserror::Error, Debug)]
pub enum LeaderboardError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid leaderboard name: {0:?}")]
    InvalidName(String),
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for game construction and persistence.
pub type GameResult<T> = Result<T, GameError>;
