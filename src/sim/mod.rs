//! Deterministic round simulation
//!
//! All gameplay logic lives here:
//! - Fixed timestep only; every duration is counted in ticks
//! - Seeded RNG only (map layout, drops, enemy colors)
//! - No rendering, input or platform dependencies

pub mod ai;
pub mod config;
pub mod grid;
pub mod mapgen;
pub mod pathfinding;
pub mod state;
pub mod tick;

pub use ai::{Decision, Surroundings};
pub use config::SimConfig;
pub use grid::{Grid, is_valid_move, valid};
pub use pathfinding::find_path;
pub use state::{
    Bomb, Difficulty, Enemy, Explosion, Pickup, Player, PowerUp, PowerUpKind, Rgb, Round, Stats, Wall,
};
pub use tick::{RoundOutcome, TickInput, TickReport, place_bomb, tick, trigger_explosion};
