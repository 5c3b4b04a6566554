//! Map generation
//!
//! Walls first (border ring, checkerboard pillars, random bricks), then enemies
//! placed by rejection sampling against distance constraints.

use glam::IVec2;
use rand::Rng;

use super::grid::is_valid_move;
use super::state::{Round, Wall};
use crate::manhattan;

/// Populate an empty round with walls and enemies
pub fn generate(round: &mut Round) {
    generate_walls(round);
    spawn_enemies(round, round.difficulty.enemy_count());
}

fn generate_walls(round: &mut Round) {
    let width = round.config.width;
    let height = round.config.height;
    let density = match round.config.destructible_density {
        d if d.is_nan() => 0.0,
        d => d.clamp(0.0, 1.0),
    };

    for y in 0..height {
        for x in 0..width {
            let pos = IVec2::new(x, y);
            let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
            if border || (x % 2 == 0 && y % 2 == 0) {
                round.walls.push(Wall::new(pos, false));
                continue;
            }
            if round.config.in_safe_zone(pos) {
                continue;
            }
            if round.rng.random_bool(density) {
                round.walls.push(Wall::new(pos, true));
            }
        }
    }
}

/// Place up to `count` enemies; accepts a partial spawn once attempts run out
fn spawn_enemies(round: &mut Round, count: usize) {
    let width = round.config.width;
    let height = round.config.height;
    let spawn = round.player.pos;
    let mut placed: Vec<IVec2> = Vec::with_capacity(count);
    let mut attempts = 0;

    while placed.len() < count && attempts < round.config.spawn_attempts {
        attempts += 1;
        let pos = IVec2::new(
            round.rng.random_range(1..width - 1),
            round.rng.random_range(1..height - 1),
        );

        if !is_valid_move(pos, width, height, &round.walls) {
            continue;
        }
        if manhattan(pos, spawn) < round.config.min_enemy_player_distance {
            continue;
        }
        if placed
            .iter()
            .any(|other| manhattan(pos, *other) < round.config.min_enemy_spacing)
        {
            continue;
        }

        placed.push(pos);
        round.spawn_enemy(pos);
    }

    if placed.len() < count {
        log::warn!(
            "Only placed {}/{} enemies after {} attempts",
            placed.len(),
            count,
            attempts
        );
    }
}
