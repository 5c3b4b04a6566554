//! Entity model and round state
//!
//! A `Round` owns every entity list plus the RNG. It is built once and reset
//! (not recreated) between rounds, so nothing from a previous round survives
//! a restart.

use std::collections::VecDeque;
use std::time::Instant;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::config::SimConfig;
use super::mapgen;
use crate::consts::*;
use crate::error::ConfigError;

/// Display color owned by an entity (cosmetic only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const STEEL: Rgb = Rgb::new(99, 110, 114);
    pub const BRICK: Rgb = Rgb::new(214, 48, 49);
    pub const FIRE: Rgb = Rgb::new(255, 140, 0);
    pub const GOLD: Rgb = Rgb::new(255, 215, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert hue/saturation/brightness (all 0..=1) to RGB
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let to_byte = |v: f32| (v * 255.0 + 0.5).clamp(0.0, 255.0) as u8;
        if saturation <= 0.0 {
            let v = to_byte(brightness);
            return Self::new(v, v, v);
        }

        let h = (hue - hue.floor()) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = brightness * (1.0 - saturation);
        let q = brightness * (1.0 - saturation * f);
        let t = brightness * (1.0 - saturation * (1.0 - f));
        let (r, g, b) = match sector as u32 {
            0 => (brightness, t, p),
            1 => (q, brightness, p),
            2 => (p, brightness, t),
            3 => (p, q, brightness),
            4 => (t, p, brightness),
            _ => (brightness, p, q),
        };
        Self::new(to_byte(r), to_byte(g), to_byte(b))
    }
}

/// Global difficulty setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    /// Enemies placed by map generation
    pub fn enemy_count(&self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 6,
            Difficulty::Hard => 10,
        }
    }

    /// Ticks between enemy moves
    pub fn move_interval(&self) -> u32 {
        match self {
            Difficulty::Easy => 45,
            Difficulty::Medium => 25,
            Difficulty::Hard => 10,
        }
    }
}

/// Power-up effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Faster movement (x1.5)
    Speed,
    /// +2 simultaneous bombs
    BombCapacity,
    /// +2 explosion radius
    ExplosionRange,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Speed,
        PowerUpKind::BombCapacity,
        PowerUpKind::ExplosionRange,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PowerUpKind::Speed => "Speed Boost",
            PowerUpKind::BombCapacity => "Bomb Capacity+",
            PowerUpKind::ExplosionRange => "Explosion Range+",
        }
    }

    /// Effect duration in ticks
    pub fn duration(&self) -> u32 {
        match self {
            PowerUpKind::Speed => 900,
            PowerUpKind::BombCapacity | PowerUpKind::ExplosionRange => 1200,
        }
    }
}

/// An active timed effect on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub remaining: u32,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind) -> Self {
        Self {
            kind,
            remaining: kind.duration(),
        }
    }
}

/// Player stats derived from base values and active effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Movement speed multiplier (1.0 = normal)
    pub speed: f32,
    /// Maximum simultaneous bombs
    pub max_bombs: u32,
    /// Explosion radius of newly placed bombs
    pub bomb_radius: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            speed: 1.0,
            max_bombs: DEFAULT_MAX_BOMBS,
            bomb_radius: DEFAULT_BOMB_RADIUS,
        }
    }
}

impl Stats {
    /// Fold every active effect over the base stats
    pub fn derive(effects: &[PowerUp]) -> Self {
        let mut stats = Self::default();
        let mut extra_bombs = 0i32;
        for effect in effects {
            match effect.kind {
                PowerUpKind::Speed => stats.speed = 1.5,
                PowerUpKind::BombCapacity => extra_bombs += 2,
                PowerUpKind::ExplosionRange => stats.bomb_radius += 2,
            }
        }
        stats.max_bombs = (stats.max_bombs as i32 + extra_bombs).max(1) as u32;
        stats.bomb_radius = stats.bomb_radius.max(1);
        stats
    }
}

/// The single player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: IVec2,
    pub hp: u32,
    pub max_hp: u32,
    /// Remaining damage immunity
    pub invincible_ticks: u32,
    /// Ticks until the next step is allowed
    pub move_delay: u32,
    pub power_ups: Vec<PowerUp>,
    pub stats: Stats,
    pub active: bool,
    pub color: Rgb,
    spawn: IVec2,
}

impl Player {
    pub fn new(spawn: IVec2) -> Self {
        Self {
            pos: spawn,
            hp: DEFAULT_MAX_HP,
            max_hp: DEFAULT_MAX_HP,
            invincible_ticks: 0,
            move_delay: 0,
            power_ups: Vec::new(),
            stats: Stats::default(),
            active: true,
            color: Rgb::WHITE,
            spawn,
        }
    }

    /// Restore spawn position, full health and base stats
    pub fn reset(&mut self) {
        self.pos = self.spawn;
        self.hp = self.max_hp;
        self.invincible_ticks = 0;
        self.move_delay = 0;
        self.active = true;
        self.power_ups.clear();
        self.stats = Stats::default();
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_ticks > 0
    }

    /// Take one point of damage unless invincible
    ///
    /// Returns true if damage was taken.
    pub fn damage(&mut self) -> bool {
        if self.is_invincible() {
            return false;
        }
        self.hp = self.hp.saturating_sub(1);
        self.invincible_ticks = INVINCIBILITY_TICKS;
        if self.hp == 0 {
            self.active = false;
        }
        true
    }

    /// Tick down invincibility and effect durations
    ///
    /// Returns the kinds that expired this tick.
    pub fn update_status(&mut self) -> Vec<PowerUpKind> {
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);

        let mut expired = Vec::new();
        self.power_ups.retain_mut(|effect| {
            effect.remaining = effect.remaining.saturating_sub(1);
            if effect.remaining == 0 {
                expired.push(effect.kind);
                false
            } else {
                true
            }
        });
        if !expired.is_empty() {
            self.recompute_stats();
        }
        expired
    }

    /// Add a timed effect; effects of any kind stack independently
    pub fn add_power_up(&mut self, kind: PowerUpKind) {
        self.power_ups.push(PowerUp::new(kind));
        self.recompute_stats();
    }

    /// Re-derive stats from the active effect list
    pub fn recompute_stats(&mut self) {
        self.stats = Stats::derive(&self.power_ups);
    }

    pub fn max_bombs(&self) -> u32 {
        self.stats.max_bombs
    }

    pub fn bomb_radius(&self) -> i32 {
        self.stats.bomb_radius
    }

    /// Delay applied after a successful step, shortened by the speed multiplier
    pub fn step_delay(&self) -> u32 {
        ((MOVE_DELAY_TICKS as f32 / self.stats.speed).round() as u32).max(1)
    }
}

/// A wall tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub pos: IVec2,
    pub destructible: bool,
    pub color: Rgb,
}

impl Wall {
    pub fn new(pos: IVec2, destructible: bool) -> Self {
        Self {
            pos,
            destructible,
            color: if destructible { Rgb::BRICK } else { Rgb::STEEL },
        }
    }
}

/// A placed bomb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub pos: IVec2,
    /// Ticks until detonation
    pub fuse: u32,
    /// Radius captured from the player at placement
    pub radius: i32,
    pub active: bool,
    pub color: Rgb,
}

impl Bomb {
    pub fn new(pos: IVec2, radius: i32) -> Self {
        Self {
            pos,
            fuse: BOMB_FUSE_TICKS,
            radius,
            active: true,
            color: Rgb::BLACK,
        }
    }

    /// Burn the fuse; returns true on the tick the bomb goes off
    pub fn update(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.fuse = self.fuse.saturating_sub(1);
        if self.fuse == 0 {
            self.active = false;
            return true;
        }
        false
    }
}

/// One burning tile of a blast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: IVec2,
    /// Remaining lifetime
    pub ttl: u32,
    pub active: bool,
    pub color: Rgb,
}

impl Explosion {
    pub fn new(pos: IVec2) -> Self {
        Self {
            pos,
            ttl: EXPLOSION_TICKS,
            active: true,
            color: Rgb::FIRE,
        }
    }

    pub fn update(&mut self) {
        self.ttl = self.ttl.saturating_sub(1);
        if self.ttl == 0 {
            self.active = false;
        }
    }
}

/// A hunting enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: IVec2,
    pub color: Rgb,
    /// Ticks between moves (set from difficulty)
    pub move_interval: u32,
    /// Ticks until the next decision
    pub move_timer: u32,
    /// Cached A* walk; the head is the current cell
    pub path: Option<VecDeque<IVec2>>,
    /// Decisions until the cached path is recomputed
    pub path_refresh: u32,
    pub active: bool,
}

impl Enemy {
    pub fn new(id: u32, pos: IVec2, difficulty: Difficulty, color: Rgb) -> Self {
        Self {
            id,
            pos,
            color,
            move_interval: difficulty.move_interval(),
            move_timer: 0,
            path: None,
            path_refresh: 0,
            active: true,
        }
    }
}

/// A power-up lying on the floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: IVec2,
    pub kind: PowerUpKind,
}

/// Complete state of one round
#[derive(Debug, Clone)]
pub struct Round {
    pub config: SimConfig,
    pub difficulty: Difficulty,
    pub player: Player,
    pub walls: Vec<Wall>,
    pub enemies: Vec<Enemy>,
    pub bombs: Vec<Bomb>,
    pub explosions: Vec<Explosion>,
    pub pickups: Vec<Pickup>,
    /// Simulation ticks since the round started
    pub ticks: u64,
    /// Seed the current round was generated from
    pub seed: u64,
    /// Wall-clock seconds recorded when the round was won
    pub finished_secs: Option<u64>,
    pub(crate) rng: Pcg32,
    started_at: Instant,
    next_id: u32,
}

impl Round {
    /// Create an empty round (no map yet)
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or(0);
        Ok(Self {
            player: Player::new(config.spawn),
            difficulty: Difficulty::default(),
            walls: Vec::new(),
            enemies: Vec::new(),
            bombs: Vec::new(),
            explosions: Vec::new(),
            pickups: Vec::new(),
            ticks: 0,
            seed,
            finished_secs: None,
            rng: Pcg32::seed_from_u64(seed),
            started_at: Instant::now(),
            next_id: 1,
            config,
        })
    }

    /// Drop every entity from the current round
    pub fn clear(&mut self) {
        self.walls.clear();
        self.enemies.clear();
        self.bombs.clear();
        self.explosions.clear();
        self.pickups.clear();
        self.ticks = 0;
        self.finished_secs = None;
    }

    /// Tear down the current round and generate a fresh map
    pub fn restart(&mut self, difficulty: Difficulty) {
        self.clear();
        self.difficulty = difficulty;
        self.player.reset();

        self.seed = self.config.seed.unwrap_or_else(rand::random);
        self.rng = Pcg32::seed_from_u64(self.seed);
        mapgen::generate(self);

        self.started_at = Instant::now();
        log::info!(
            "Round started: {} difficulty, {} walls, {} enemies (seed {})",
            difficulty.as_str(),
            self.walls.len(),
            self.enemies.len(),
            self.seed
        );
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn an enemy at a cell with a random hue
    pub fn spawn_enemy(&mut self, pos: IVec2) {
        let id = self.next_entity_id();
        let hue = self.rng.random::<f32>();
        let color = Rgb::from_hsb(hue, 0.7, 0.6);
        self.enemies.push(Enemy::new(id, pos, self.difficulty, color));
    }

    /// Wall-clock seconds since the round started
    pub fn elapsed_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn wall_at(&self, pos: IVec2) -> Option<&Wall> {
        self.walls.iter().find(|w| w.pos == pos)
    }

    pub fn bomb_at(&self, pos: IVec2) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.pos == pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_defaults() {
        let player = Player::new(IVec2::new(1, 1));
        assert_eq!(player.pos, IVec2::new(1, 1));
        assert_eq!(player.hp, 3);
        assert!(player.active);
        assert_eq!(player.stats.speed, 1.0);
        assert_eq!(player.max_bombs(), 3);
        assert_eq!(player.bomb_radius(), 3);
        assert_eq!(player.step_delay(), MOVE_DELAY_TICKS);
    }

    #[test]
    fn test_damage_and_invincibility() {
        let mut player = Player::new(IVec2::new(1, 1));
        assert!(player.damage());
        assert_eq!(player.hp, 2);
        assert_eq!(player.invincible_ticks, INVINCIBILITY_TICKS);

        // Second hit inside the window is a no-op
        assert!(!player.damage());
        assert_eq!(player.hp, 2);

        for _ in 0..INVINCIBILITY_TICKS {
            player.update_status();
        }
        assert!(!player.is_invincible());
        assert!(player.damage());
        assert_eq!(player.hp, 1);
    }

    #[test]
    fn test_hp_never_underflows() {
        let mut player = Player::new(IVec2::new(1, 1));
        for _ in 0..5 {
            player.invincible_ticks = 0;
            player.damage();
        }
        assert_eq!(player.hp, 0);
        assert!(!player.active);
    }

    #[test]
    fn test_power_ups_stack_and_expire() {
        let mut player = Player::new(IVec2::new(1, 1));
        player.add_power_up(PowerUpKind::BombCapacity);
        player.add_power_up(PowerUpKind::ExplosionRange);
        player.add_power_up(PowerUpKind::ExplosionRange);
        assert_eq!(player.max_bombs(), 5);
        assert_eq!(player.bomb_radius(), 7);

        player.add_power_up(PowerUpKind::Speed);
        assert_eq!(player.stats.speed, 1.5);
        assert_eq!(player.step_delay(), 5);

        // Speed lasts 900 ticks, the others 1200
        for _ in 0..899 {
            assert!(player.update_status().is_empty());
        }
        assert_eq!(player.update_status(), vec![PowerUpKind::Speed]);
        assert_eq!(player.stats.speed, 1.0);
        assert_eq!(player.bomb_radius(), 7);

        for _ in 0..300 {
            player.update_status();
        }
        assert!(player.power_ups.is_empty());
        assert_eq!(player.stats, Stats::default());
    }

    #[test]
    fn test_reset_clears_effects() {
        let mut player = Player::new(IVec2::new(1, 1));
        player.damage();
        player.pos = IVec2::new(5, 5);
        player.add_power_up(PowerUpKind::Speed);
        player.reset();

        assert_eq!(player.hp, 3);
        assert_eq!(player.pos, IVec2::new(1, 1));
        assert!(player.power_ups.is_empty());
        assert!(!player.is_invincible());
        assert_eq!(player.stats.speed, 1.0);
    }

    #[test]
    fn test_bomb_fuse() {
        let mut bomb = Bomb::new(IVec2::new(3, 3), 2);
        for _ in 0..BOMB_FUSE_TICKS - 1 {
            assert!(!bomb.update());
        }
        assert!(bomb.active);
        assert!(bomb.update());
        assert!(!bomb.active);
        // Spent bombs never fire twice
        assert!(!bomb.update());
    }

    #[test]
    fn test_explosion_lifetime() {
        let mut explosion = Explosion::new(IVec2::new(2, 2));
        for _ in 0..EXPLOSION_TICKS - 1 {
            explosion.update();
        }
        assert!(explosion.active);
        explosion.update();
        assert!(!explosion.active);
    }

    #[test]
    fn test_difficulty_tables() {
        let counts: Vec<usize> = Difficulty::ALL.iter().map(|d| d.enemy_count()).collect();
        let intervals: Vec<u32> = Difficulty::ALL.iter().map(|d| d.move_interval()).collect();
        assert_eq!(counts, vec![3, 6, 10]);
        assert_eq!(intervals, vec![45, 25, 10]);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn test_hsb_primaries() {
        assert_eq!(Rgb::from_hsb(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsb(1.0 / 3.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsb(0.5, 0.0, 1.0), Rgb::WHITE);
    }

    #[test]
    fn test_round_restart_is_clean() {
        let config = SimConfig {
            seed: Some(7),
            ..Default::default()
        };
        let mut round = Round::new(config).unwrap();
        round.restart(Difficulty::Easy);
        round.bombs.push(Bomb::new(IVec2::new(1, 1), 3));
        round.explosions.push(Explosion::new(IVec2::new(1, 2)));
        round.player.damage();

        round.restart(Difficulty::Hard);
        assert!(round.bombs.is_empty());
        assert!(round.explosions.is_empty());
        assert_eq!(round.player.hp, 3);
        assert_eq!(round.difficulty, Difficulty::Hard);
        assert!(round.enemies.iter().all(|e| e.move_interval == 10));
    }

    #[test]
    fn test_round_rejects_bad_config() {
        let config = SimConfig {
            width: 3,
            height: 3,
            ..Default::default()
        };
        assert!(Round::new(config).is_err());

        let nan_density = SimConfig {
            destructible_density: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(Round::new(nan_density), Err(ConfigError::InvalidDensity(_))));
    }
}
