//! Game settings and preferences
//!
//! Display and audio preferences, persisted as JSON. Difficulty is not a
//! setting; it belongs to the running game.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Selectable window sizes
pub const RESOLUTIONS: [(u32, u32); 14] = [
    (640, 480),
    (800, 600),
    (1024, 576),
    (1024, 768),
    (1152, 648),
    (1280, 720),
    (1280, 800),
    (1366, 768),
    (1440, 900),
    (1600, 900),
    (1680, 1050),
    (1920, 1080),
    (2560, 1440),
    (3840, 2160),
];

/// Index of 1280x720 in `RESOLUTIONS`
pub const DEFAULT_RESOLUTION: usize = 5;

/// Step applied by left/right on a volume slider
pub const VOLUME_STEP: u8 = 10;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Index into `RESOLUTIONS`
    pub resolution: usize,
    pub fullscreen: bool,

    // === Audio ===
    /// Music volume (0 - 100)
    pub music_volume: u8,
    /// Sound effects volume (0 - 100)
    pub sfx_volume: u8,

    // === Visual ===
    /// Scanline/CRT overlay
    pub retro_effects: bool,
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            fullscreen: false,
            music_volume: 70,
            sfx_volume: 80,
            retro_effects: true,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Current resolution as (width, height)
    pub fn resolution_size(&self) -> (u32, u32) {
        RESOLUTIONS
            .get(self.resolution)
            .copied()
            .unwrap_or(RESOLUTIONS[DEFAULT_RESOLUTION])
    }

    pub fn resolution_label(&self) -> String {
        let (w, h) = self.resolution_size();
        format!("{}x{}", w, h)
    }

    /// Step through the resolution list, wrapping at both ends
    pub fn cycle_resolution(&mut self, forward: bool) {
        let len = RESOLUTIONS.len();
        let current = self.resolution.min(len - 1);
        self.resolution = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
    }

    /// Nudge a volume by one step in either direction, clamped to 0..=100
    pub fn adjust_volume(volume: u8, up: bool) -> u8 {
        if up {
            volume.saturating_add(VOLUME_STEP).min(100)
        } else {
            volume.saturating_sub(VOLUME_STEP)
        }
    }

    /// Load settings from a JSON file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&json)?;
        settings.resolution = settings.resolution.min(RESOLUTIONS.len() - 1);
        settings.music_volume = settings.music_volume.min(100);
        settings.sfx_volume = settings.sfx_volume.min(100);
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.resolution_size(), (1280, 720));
        assert_eq!(settings.resolution_label(), "1280x720");
        assert_eq!(settings.music_volume, 70);
        assert_eq!(settings.sfx_volume, 80);
        assert!(settings.retro_effects);
        assert!(!settings.show_fps);
    }

    #[test]
    fn test_cycle_resolution_wraps() {
        let mut settings = Settings {
            resolution: 0,
            ..Default::default()
        };
        settings.cycle_resolution(false);
        assert_eq!(settings.resolution, RESOLUTIONS.len() - 1);
        settings.cycle_resolution(true);
        assert_eq!(settings.resolution, 0);
    }

    #[test]
    fn test_volume_clamps() {
        assert_eq!(Settings::adjust_volume(95, true), 100);
        assert_eq!(Settings::adjust_volume(100, true), 100);
        assert_eq!(Settings::adjust_volume(5, false), 0);
        assert_eq!(Settings::adjust_volume(70, false), 60);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings {
            resolution: 11,
            fullscreen: true,
            music_volume: 30,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "show_fps": true, "resolution": 99 }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert!(settings.show_fps);
        assert_eq!(settings.resolution, RESOLUTIONS.len() - 1);
        assert_eq!(settings.sfx_volume, 80);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Json(_))));
    }
}
