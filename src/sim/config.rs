//! Simulation configuration
//!
//! Validated once when a `Round` is built; a bad config is the only fatal
//! error the simulation can produce.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Map and spawn parameters for a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Grid width in cells (including the border ring)
    pub width: i32,
    /// Grid height in cells (including the border ring)
    pub height: i32,
    /// Player spawn cell
    pub spawn: IVec2,
    /// Chebyshev radius around the spawn kept clear of destructible walls
    pub safe_zone_radius: i32,
    /// Probability that an open interior cell gets a destructible wall
    pub destructible_density: f64,
    /// Minimum Manhattan distance between an enemy spawn and the player spawn
    pub min_enemy_player_distance: u32,
    /// Minimum Manhattan distance between two enemy spawns
    pub min_enemy_spacing: u32,
    /// Random placement attempts before accepting a partial enemy spawn
    pub spawn_attempts: u32,
    /// Chance that a destroyed wall leaves a power-up behind
    pub powerup_drop_chance: f32,
    /// Fixed RNG seed (None = fresh seed per round)
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            spawn: IVec2::new(1, 1),
            safe_zone_radius: 1,
            destructible_density: 0.4,
            min_enemy_player_distance: 6,
            min_enemy_spacing: 3,
            spawn_attempts: 1000,
            powerup_drop_chance: 0.1,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Check the configuration is playable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_GRID_SIZE || self.height < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
                min: MIN_GRID_SIZE,
            });
        }

        let interior = self.spawn.x > 0
            && self.spawn.y > 0
            && self.spawn.x < self.width - 1
            && self.spawn.y < self.height - 1;
        if !interior {
            return Err(ConfigError::InvalidSpawn {
                x: self.spawn.x,
                y: self.spawn.y,
            });
        }

        if self.spawn.x % 2 == 0 && self.spawn.y % 2 == 0 {
            return Err(ConfigError::SpawnOnPillar {
                x: self.spawn.x,
                y: self.spawn.y,
            });
        }

        // NaN fails the range check too
        if !(0.0..=1.0).contains(&self.destructible_density) {
            return Err(ConfigError::InvalidDensity(self.destructible_density));
        }

        if !(0.0..=1.0).contains(&self.powerup_drop_chance) {
            return Err(ConfigError::InvalidDropChance(self.powerup_drop_chance));
        }

        Ok(())
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if a cell is inside the spawn safe zone
    pub fn in_safe_zone(&self, pos: IVec2) -> bool {
        let d = (pos - self.spawn).abs();
        d.x <= self.safe_zone_radius && d.y <= self.safe_zone_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_grid_too_small() {
        let config = SimConfig {
            width: 4,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::GridTooSmall { width: 4, height: 15, min: 5 })
        );
    }

    #[test]
    fn test_spawn_on_border_rejected() {
        let config = SimConfig {
            spawn: IVec2::new(0, 3),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpawn { x: 0, y: 3 }));
    }

    #[test]
    fn test_spawn_on_pillar_rejected() {
        let config = SimConfig {
            spawn: IVec2::new(2, 2),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SpawnOnPillar { x: 2, y: 2 }));

        let odd_row = SimConfig {
            spawn: IVec2::new(2, 3),
            ..Default::default()
        };
        assert_eq!(odd_row.validate(), Ok(()));
    }

    #[test]
    fn test_density_range() {
        for density in [f64::NAN, -0.1, 1.5, f64::INFINITY] {
            let config = SimConfig {
                destructible_density: density,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidDensity(_))),
                "density {density}"
            );
        }
    }

    #[test]
    fn test_drop_chance_range() {
        let config = SimConfig {
            powerup_drop_chance: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDropChance(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "width": 11, "height": 9, "seed": 42 }"#).unwrap();
        assert_eq!(config.width, 11);
        assert_eq!(config.height, 9);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.spawn, IVec2::new(1, 1));
        assert_eq!(config.spawn_attempts, 1000);
    }

    #[test]
    fn test_safe_zone_matches_reference_corner() {
        let config = SimConfig::default();
        for y in 0..5 {
            for x in 0..5 {
                let pos = IVec2::new(x, y);
                assert_eq!(config.in_safe_zone(pos), x < 3 && y < 3, "cell {pos}");
            }
        }
    }
}
