//! Bomber Quest - a tile-grid arena bomber
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (grid, pathfinding, entities, AI, map generation)
//! - `game`: Mode state machine and the event outbox drained by the driver
//! - `transition`: Timed visual transitions that defer the mode swap to their midpoint
//! - `render`: Drawable surface contract
//! - `leaderboard` / `settings`: Thin persistence collaborators

pub mod error;
pub mod game;
pub mod input;
pub mod leaderboard;
pub mod render;
pub mod settings;
pub mod sim;
pub mod transition;

pub use error::{ConfigError, GameError, GameResult, LeaderboardError, SettingsError};
pub use game::{Game, GameEvent, Mode, ModeKind};
pub use leaderboard::Leaderboard;
pub use settings::Settings;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
///
/// Every duration is expressed in ticks; the reference cadence is `TICK_RATE`.
pub mod consts {
    /// Reference tick rate (ticks per second)
    pub const TICK_RATE: u32 = 60;

    /// Reference grid size
    pub const GRID_WIDTH: i32 = 25;
    pub const GRID_HEIGHT: i32 = 15;
    /// Smallest playable grid edge
    pub const MIN_GRID_SIZE: i32 = 5;

    /// Bomb fuse (1 second)
    pub const BOMB_FUSE_TICKS: u32 = 60;
    /// Lifetime of one explosion tile
    pub const EXPLOSION_TICKS: u32 = 15;
    /// Damage immunity window after a hit (2 seconds)
    pub const INVINCIBILITY_TICKS: u32 = 120;
    /// Ticks between player steps at base speed (lower = faster)
    pub const MOVE_DELAY_TICKS: u32 = 8;
    /// Enemy decision cycles between A* recomputations
    pub const PATH_REFRESH_TICKS: u32 = 10;
    /// Full length of a mode transition
    pub const TRANSITION_TICKS: u32 = 20;

    /// Player defaults
    pub const DEFAULT_MAX_HP: u32 = 3;
    pub const DEFAULT_MAX_BOMBS: u32 = 3;
    pub const DEFAULT_BOMB_RADIUS: i32 = 3;

    /// Longest leaderboard name accepted by the victory prompt
    pub const MAX_NAME_LEN: usize = 12;
}

/// One of the four cardinal directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed expansion order used by pathfinding, propagation and the greedy fallback
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Grid offset of a single step (y grows downward)
    #[inline]
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// Squared Euclidean distance between two cells
#[inline]
pub fn distance_squared(a: IVec2, b: IVec2) -> i32 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}
