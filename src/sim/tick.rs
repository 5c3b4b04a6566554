//! Fixed timestep simulation tick
//!
//! Core round loop. Steps run in a fixed order every tick:
//! player status, player movement, bomb fuses (and the blasts they trigger),
//! explosion aging and damage, enemy AI and contact, terminal check.

use glam::IVec2;
use rand::Rng;

use super::ai::{self, Surroundings};
use super::grid::{Grid, is_valid_move, valid};
use super::state::{Bomb, Explosion, Pickup, PowerUpKind, Round};
use crate::Direction;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held movement direction, if any
    pub direction: Option<Direction>,
}

/// Result of a round after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundOutcome {
    #[default]
    Ongoing,
    /// Player hp reached zero
    Defeat,
    /// Every enemy is gone
    Victory { elapsed_secs: u64 },
}

/// What happened during one tick (consumed by the mode machine for sounds)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub outcome: RoundOutcome,
    pub detonations: u32,
    pub player_hits: u32,
    pub enemies_destroyed: u32,
    pub collected: Vec<PowerUpKind>,
}

/// Advance the round by one fixed timestep
pub fn tick(round: &mut Round, input: &TickInput) -> TickReport {
    let mut report = TickReport::default();
    round.ticks += 1;

    // 1. Status effects
    for kind in round.player.update_status() {
        log::debug!("{} expired", kind.name());
    }

    // 2. Movement
    step_player(round, input.direction, &mut report);

    // 3-4. Fuses and propagation
    let mut detonated = Vec::new();
    for bomb in &mut round.bombs {
        if bomb.update() {
            detonated.push((bomb.pos, bomb.radius));
        }
    }
    round.bombs.retain(|b| b.active);
    for (pos, radius) in detonated {
        log::debug!("Bomb at {} detonated (radius {})", pos, radius);
        trigger_explosion(round, pos, radius);
        report.detonations += 1;
    }

    // 5. Explosion aging and damage
    for explosion in &mut round.explosions {
        explosion.update();
    }
    let player_pos = round.player.pos;
    if round.explosions.iter().any(|e| e.pos == player_pos) && round.player.damage() {
        report.player_hits += 1;
    }
    let before = round.enemies.len();
    let explosions = &round.explosions;
    round
        .enemies
        .retain(|enemy| !explosions.iter().any(|e| e.pos == enemy.pos));
    report.enemies_destroyed = (before - round.enemies.len()) as u32;
    round.explosions.retain(|e| e.active);

    // 6. Enemy AI
    update_enemies(round, &mut report);

    // 7. Terminal check, defeat first
    report.outcome = if round.player.hp == 0 {
        RoundOutcome::Defeat
    } else if round.enemies.is_empty() {
        let elapsed_secs = match round.finished_secs {
            Some(secs) => secs,
            None => {
                let secs = round.elapsed_secs();
                round.finished_secs = Some(secs);
                log::info!("Round won in {}s", secs);
                secs
            }
        };
        RoundOutcome::Victory { elapsed_secs }
    } else {
        RoundOutcome::Ongoing
    };

    report
}

fn step_player(round: &mut Round, direction: Option<Direction>, report: &mut TickReport) {
    let player = &mut round.player;
    if player.move_delay > 0 {
        player.move_delay -= 1;
        return;
    }
    let Some(dir) = direction else {
        return;
    };

    let target = player.pos + dir.offset();
    let blocked_by_bomb = round.bombs.iter().any(|b| b.pos == target);
    if blocked_by_bomb || !is_valid_move(target, round.config.width, round.config.height, &round.walls) {
        return;
    }

    player.pos = target;
    player.move_delay = player.step_delay();

    if let Some(i) = round.pickups.iter().position(|p| p.pos == target) {
        let pickup = round.pickups.remove(i);
        log::info!("Collected {}", pickup.kind.name());
        player.add_power_up(pickup.kind);
        report.collected.push(pickup.kind);
    }
}

fn update_enemies(round: &mut Round, report: &mut TickReport) {
    let mut blocked = Grid::new(round.config.width, round.config.height, false);
    for wall in &round.walls {
        blocked.set(wall.pos, true);
    }
    for bomb in &round.bombs {
        blocked.set(bomb.pos, true);
    }

    // Positions are updated as each enemy moves so later enemies see earlier moves
    let mut positions: Vec<IVec2> = round.enemies.iter().map(|e| e.pos).collect();
    let player = round.player.pos;
    let difficulty = round.difficulty;

    for (i, enemy) in round.enemies.iter_mut().enumerate() {
        let env = Surroundings {
            width: round.config.width,
            height: round.config.height,
            blocked: &blocked,
            enemies: &positions,
            player,
        };
        if let Some(pos) = ai::advance(enemy, i, &env, difficulty).moved_to() {
            positions[i] = pos;
        }
        if enemy.pos == player && round.player.damage() {
            report.player_hits += 1;
        }
    }
}

/// Spread a blast from `center` up to `radius` tiles in each direction
///
/// Indestructible walls stop the blast before their tile. A destructible wall
/// is destroyed, burns, and stops the blast beyond it. Open tiles burn and the
/// blast continues.
pub fn trigger_explosion(round: &mut Round, center: IVec2, radius: i32) {
    let width = round.config.width;
    let height = round.config.height;
    round.explosions.push(Explosion::new(center));

    for dir in Direction::ALL {
        for step in 1..=radius {
            let pos = center + dir.offset() * step;
            if !valid(pos, width, height) {
                break;
            }
            match round.walls.iter().position(|w| w.pos == pos) {
                Some(i) if !round.walls[i].destructible => break,
                Some(i) => {
                    round.walls.remove(i);
                    round.explosions.push(Explosion::new(pos));
                    drop_pickup(round, pos);
                    break;
                }
                None => round.explosions.push(Explosion::new(pos)),
            }
        }
    }
}

fn drop_pickup(round: &mut Round, pos: IVec2) {
    let chance = f64::from(round.config.powerup_drop_chance);
    if !round.rng.random_bool(chance) {
        return;
    }
    let kind = PowerUpKind::ALL[round.rng.random_range(0..PowerUpKind::ALL.len())];
    log::debug!("{} dropped at {}", kind.name(), pos);
    round.pickups.push(Pickup { pos, kind });
}

/// Place a bomb on the player's cell
///
/// Returns false when a bomb already sits there or the player is at capacity.
pub fn place_bomb(round: &mut Round) -> bool {
    let player = &round.player;
    if !player.active || round.bomb_at(player.pos).is_some() {
        return false;
    }
    if round.bombs.len() >= player.max_bombs() as usize {
        return false;
    }
    round.bombs.push(Bomb::new(player.pos, player.bomb_radius()));
    true
}
