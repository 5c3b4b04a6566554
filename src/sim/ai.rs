//! Enemy decision loop
//!
//! Each enemy runs on its own move timer. On a decision cycle it follows a
//! cached A* path toward the player's last known cell, refreshing it
//! periodically, and falls back to a single greedy step when no path is usable.

use std::collections::VecDeque;

use glam::IVec2;

use super::grid::Grid;
use super::pathfinding::find_path;
use super::state::{Difficulty, Enemy};
use crate::consts::PATH_REFRESH_TICKS;
use crate::{Direction, distance_squared};

/// Snapshot of everything an enemy looks at when deciding
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub width: i32,
    pub height: i32,
    /// Cells occupied by walls or bombs
    pub blocked: &'a Grid<bool>,
    /// Current enemy positions, indexed like the round's enemy list
    pub enemies: &'a [IVec2],
    pub player: IVec2,
}

impl Surroundings<'_> {
    /// Check if the enemy at `index` may occupy `pos`
    pub fn is_walkable(&self, pos: IVec2, index: usize) -> bool {
        if !self.blocked.contains(pos) || self.blocked.at(pos) {
            return false;
        }
        !self
            .enemies
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && *other == pos)
    }
}

/// What an enemy did on this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Move timer still running
    Waiting,
    /// Stepped along the cached path
    Followed(IVec2),
    /// Stepped by the greedy fallback
    Greedy(IVec2),
    /// Already standing on the player's cell
    Arrived,
    /// No valid neighbor; stayed put
    Stuck,
}

impl Decision {
    /// Cell the enemy moved into, if any
    pub fn moved_to(&self) -> Option<IVec2> {
        match self {
            Decision::Followed(pos) | Decision::Greedy(pos) => Some(*pos),
            _ => None,
        }
    }
}

/// Advance one enemy by a tick
pub fn advance(enemy: &mut Enemy, index: usize, env: &Surroundings, difficulty: Difficulty) -> Decision {
    if enemy.move_timer > 0 {
        enemy.move_timer -= 1;
        return Decision::Waiting;
    }

    // Picks up mid-round difficulty changes
    enemy.move_interval = difficulty.move_interval();
    enemy.move_timer = enemy.move_interval;
    enemy.path_refresh = enemy.path_refresh.saturating_sub(1);

    let exhausted = enemy.path.as_ref().is_none_or(|path| path.len() <= 1);
    if exhausted || enemy.path_refresh == 0 {
        enemy.path = find_path(enemy.pos, env.player, env.width, env.height, |p| {
            env.is_walkable(p, index)
        })
        .map(VecDeque::from);
        enemy.path_refresh = PATH_REFRESH_TICKS;
        log::debug!(
            "Enemy {} path to {}: {:?} cells",
            enemy.id,
            env.player,
            enemy.path.as_ref().map(|p| p.len())
        );
    }

    let Some(path) = enemy.path.as_mut() else {
        return greedy_step(enemy, index, env);
    };

    if path.len() == 1 {
        return Decision::Arrived;
    }

    path.pop_front();
    let Some(&next) = path.front() else {
        return greedy_step(enemy, index, env);
    };

    if env.is_walkable(next, index) {
        enemy.pos = next;
        Decision::Followed(next)
    } else {
        // Map changed under the path
        enemy.path = None;
        enemy.path_refresh = 0;
        greedy_step(enemy, index, env)
    }
}

/// One step toward the player minimizing squared distance
///
/// Ties go to the first direction in `Direction::ALL` order.
fn greedy_step(enemy: &mut Enemy, index: usize, env: &Surroundings) -> Decision {
    let mut best: Option<(i32, IVec2)> = None;
    for dir in Direction::ALL {
        let next = enemy.pos + dir.offset();
        if !env.is_walkable(next, index) {
            continue;
        }
        let dist = distance_squared(next, env.player);
        if best.is_none_or(|(best_dist, _)| dist < best_dist) {
            best = Some((dist, next));
        }
    }

    match best {
        Some((_, next)) => {
            enemy.pos = next;
            Decision::Greedy(next)
        }
        None => Decision::Stuck,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manhattan;
    use crate::sim::state::Rgb;

    fn enemy_at(pos: IVec2) -> Enemy {
        Enemy::new(1, pos, Difficulty::Hard, Rgb::WHITE)
    }

    fn bordered(width: i32, height: i32) -> Grid<bool> {
        let mut grid = Grid::new(width, height, false);
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    grid.set(IVec2::new(x, y), true);
                }
            }
        }
        grid
    }

    #[test]
    fn test_waits_out_move_timer() {
        let blocked = bordered(10, 10);
        let positions = [IVec2::new(5, 5)];
        let env = Surroundings {
            width: 10,
            height: 10,
            blocked: &blocked,
            enemies: &positions,
            player: IVec2::new(1, 1),
        };
        let mut enemy = enemy_at(IVec2::new(5, 5));
        enemy.move_timer = 2;

        assert_eq!(advance(&mut enemy, 0, &env, Difficulty::Hard), Decision::Waiting);
        assert_eq!(advance(&mut enemy, 0, &env, Difficulty::Hard), Decision::Waiting);
        assert!(advance(&mut enemy, 0, &env, Difficulty::Hard).moved_to().is_some());
        // Timer restarts at the difficulty interval
        assert_eq!(enemy.move_timer, 10);
    }

    #[test]
    fn test_chase_strictly_closes_distance() {
        let blocked = bordered(25, 15);
        let player = IVec2::new(1, 1);
        let mut enemy = enemy_at(IVec2::new(20, 10));
        let mut last = manhattan(enemy.pos, player);

        for _ in 0..2000 {
            let positions = [enemy.pos];
            let env = Surroundings {
                width: 25,
                height: 15,
                blocked: &blocked,
                enemies: &positions,
                player,
            };
            match advance(&mut enemy, 0, &env, Difficulty::Hard) {
                Decision::Waiting => {}
                Decision::Followed(pos) => {
                    let dist = manhattan(pos, player);
                    assert_eq!(dist + 1, last, "each step must close in by one");
                    last = dist;
                }
                Decision::Arrived => break,
                other => panic!("unexpected decision {other:?}"),
            }
        }
        assert_eq!(enemy.pos, player);
    }

    #[test]
    fn test_blocked_path_falls_back_to_greedy() {
        let mut blocked = bordered(10, 10);
        let player = IVec2::new(1, 5);
        let mut enemy = enemy_at(IVec2::new(5, 5));
        enemy.path = Some(VecDeque::from(vec![IVec2::new(5, 5), IVec2::new(4, 5), IVec2::new(3, 5)]));
        enemy.path_refresh = 5;

        // A bomb lands on the next path cell
        blocked.set(IVec2::new(4, 5), true);
        let positions = [enemy.pos];
        let env = Surroundings {
            width: 10,
            height: 10,
            blocked: &blocked,
            enemies: &positions,
            player,
        };

        let decision = advance(&mut enemy, 0, &env, Difficulty::Hard);
        // Up (5,4) and down (5,6) tie at 17; up wins by direction order
        assert_eq!(decision, Decision::Greedy(IVec2::new(5, 4)));
        assert!(enemy.path.is_none());
        assert_eq!(enemy.path_refresh, 0);
    }

    #[test]
    fn test_unreachable_player_uses_greedy() {
        let mut blocked = bordered(10, 10);
        // Seal the player into a pocket
        for pos in [IVec2::new(2, 1), IVec2::new(1, 2), IVec2::new(2, 2)] {
            blocked.set(pos, true);
        }
        let mut enemy = enemy_at(IVec2::new(5, 5));
        let positions = [enemy.pos];
        let env = Surroundings {
            width: 10,
            height: 10,
            blocked: &blocked,
            enemies: &positions,
            player: IVec2::new(1, 1),
        };

        assert_eq!(advance(&mut enemy, 0, &env, Difficulty::Hard), Decision::Greedy(IVec2::new(5, 4)));
        assert!(enemy.path.is_none());
    }

    #[test]
    fn test_boxed_in_enemy_stays_put() {
        let mut blocked = bordered(7, 7);
        let center = IVec2::new(3, 3);
        for dir in Direction::ALL {
            blocked.set(center + dir.offset(), true);
        }
        let mut enemy = enemy_at(center);
        let positions = [center];
        let env = Surroundings {
            width: 7,
            height: 7,
            blocked: &blocked,
            enemies: &positions,
            player: IVec2::new(1, 1),
        };

        assert_eq!(advance(&mut enemy, 0, &env, Difficulty::Hard), Decision::Stuck);
        assert_eq!(enemy.pos, center);
    }

    #[test]
    fn test_enemies_do_not_stack() {
        let blocked = bordered(10, 10);
        let positions = [IVec2::new(5, 5), IVec2::new(4, 5)];
        let env = Surroundings {
            width: 10,
            height: 10,
            blocked: &blocked,
            enemies: &positions,
            player: IVec2::new(1, 5),
        };
        assert!(!env.is_walkable(IVec2::new(4, 5), 0));
        assert!(env.is_walkable(IVec2::new(4, 5), 1));
        assert!(env.is_walkable(IVec2::new(5, 5), 0));
    }
}
