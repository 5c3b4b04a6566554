//! Drawable output of the core
//!
//! `render` walks the game once per frame and pushes cells, text lines and the
//! transition overlay into any `Surface`. The core decides what is visible;
//! the surface decides how it looks. `AsciiSurface` is a character-grid
//! surface used by the headless driver and tests.

use glam::IVec2;

use crate::game::{Game, MAIN_MENU_OPTIONS, Mode, PAUSE_OPTIONS, SETTINGS_OPTIONS, Selector};
use crate::settings::Settings;
use crate::sim::{Difficulty, PowerUpKind, Rgb, Round, valid};

/// Invincible players are hidden on alternating phases of this many ticks
pub const BLINK_TICKS: u32 = 6;

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Brick,
    Pickup(PowerUpKind),
    Bomb,
    Explosion,
    Enemy,
    Player,
}

impl Tile {
    pub fn glyph(&self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Brick => '+',
            Tile::Pickup(PowerUpKind::Speed) => 's',
            Tile::Pickup(PowerUpKind::BombCapacity) => 'b',
            Tile::Pickup(PowerUpKind::ExplosionRange) => 'r',
            Tile::Bomb => 'o',
            Tile::Explosion => '*',
            Tile::Enemy => 'E',
            Tile::Player => '@',
        }
    }
}

/// Render target
pub trait Surface {
    /// Grid size in cells
    fn size(&self) -> (i32, i32);
    /// Draw a tile; later calls on the same cell draw on top
    ///
    /// `render` only passes cells inside `size()`.
    fn fill_cell(&mut self, pos: IVec2, tile: Tile, color: Rgb);
    /// Set a text line (HUD and menus)
    fn text(&mut self, line: usize, text: &str);
    /// Full-screen transition overlay, 0 = clear, 1 = opaque
    fn overlay(&mut self, alpha: f32);
}

/// Draw one frame of the game
pub fn render<S: Surface>(surface: &mut S, game: &Game) {
    let mut lines = Vec::new();

    match game.mode() {
        Mode::Playing(_) | Mode::GameOver | Mode::Victory(_) => {
            draw_round(surface, game.round());
            lines.push(hud_line(game.round()));
        }
        _ => {}
    }
    lines.extend(mode_lines(game));

    for (i, line) in lines.iter().enumerate() {
        surface.text(i, line);
    }

    let transitions = game.transitions();
    if transitions.is_transitioning() {
        surface.overlay(transitions.overlay_alpha());
    }
}

fn draw_round<S: Surface>(surface: &mut S, round: &Round) {
    let (width, height) = surface.size();
    let mut put = |pos: IVec2, tile: Tile, color: Rgb| {
        if valid(pos, width, height) {
            surface.fill_cell(pos, tile, color);
        }
    };

    for wall in &round.walls {
        let tile = if wall.destructible { Tile::Brick } else { Tile::Wall };
        put(wall.pos, tile, wall.color);
    }
    for pickup in &round.pickups {
        put(pickup.pos, Tile::Pickup(pickup.kind), Rgb::GOLD);
    }
    for bomb in &round.bombs {
        put(bomb.pos, Tile::Bomb, bomb.color);
    }
    for explosion in &round.explosions {
        put(explosion.pos, Tile::Explosion, explosion.color);
    }
    for enemy in &round.enemies {
        put(enemy.pos, Tile::Enemy, enemy.color);
    }

    let player = &round.player;
    let blinking = player.is_invincible() && (player.invincible_ticks / BLINK_TICKS) % 2 == 1;
    if player.active && !blinking {
        put(player.pos, Tile::Player, player.color);
    }
}

fn hud_line(round: &Round) -> String {
    let mut hud = format!(
        "HP {}/{}  TIME {}s  ENEMIES {}  {}",
        round.player.hp,
        round.player.max_hp,
        round.finished_secs.unwrap_or_else(|| round.elapsed_secs()),
        round.enemies.len(),
        round.difficulty.as_str()
    );
    for effect in &round.player.power_ups {
        hud.push_str(&format!("  [{} {}s]", effect.kind.name(), effect.remaining / crate::consts::TICK_RATE));
    }
    hud
}

fn menu_lines(title: &str, options: &[&str], selector: &Selector) -> Vec<String> {
    let mut lines = vec![title.to_string()];
    for (i, option) in options.iter().enumerate() {
        let cursor = if i == selector.index() { ">" } else { " " };
        lines.push(format!("{} {}", cursor, option));
    }
    lines
}

fn settings_value(settings: &Settings, option: &str) -> String {
    let on_off = |b: bool| String::from(if b { "ON" } else { "OFF" });
    match option {
        "Resolution" => format!("< {} >", settings.resolution_label()),
        "Fullscreen" => on_off(settings.fullscreen),
        "Music Vol" => format!("< {} >", settings.music_volume),
        "SFX Vol" => format!("< {} >", settings.sfx_volume),
        "Retro Effects" => on_off(settings.retro_effects),
        "Show FPS" => on_off(settings.show_fps),
        _ => String::new(),
    }
}

/// Text for the active mode
pub fn mode_lines(game: &Game) -> Vec<String> {
    match game.mode() {
        Mode::MainMenu(menu) => {
            let mut lines = menu_lines("BOMBER QUEST", &MAIN_MENU_OPTIONS, &menu.selector);
            if menu.confirm_exit {
                lines.push("Really exit? (Enter = yes, Esc = no)".to_string());
            }
            lines
        }
        Mode::DifficultySelect(selector) => {
            let names: Vec<&str> = Difficulty::ALL.iter().map(|d| d.as_str()).collect();
            menu_lines("SELECT DIFFICULTY", &names, selector)
        }
        Mode::Playing(playing) => match &playing.pause {
            Some(selector) => menu_lines("PAUSED", &PAUSE_OPTIONS, selector),
            None => Vec::new(),
        },
        Mode::GameOver => vec![
            "GAME OVER".to_string(),
            "Enter: try again   Esc: main menu".to_string(),
        ],
        Mode::Victory(victory) => {
            let mut lines = vec![
                "VICTORY!".to_string(),
                format!("Time: {}s", victory.elapsed_secs),
            ];
            if victory.saved {
                lines.push("Score saved!".to_string());
                lines.push("Enter: play again   Esc: main menu".to_string());
            } else {
                lines.push(format!("Name: {}_", victory.name));
                if let Some(error) = &victory.error {
                    lines.push(error.clone());
                }
            }
            lines
        }
        Mode::Leaderboard => {
            let mut lines = vec!["LEADERBOARD".to_string()];
            let scores = game.leaderboard().top_scores();
            if scores.is_empty() {
                lines.push("No scores yet".to_string());
            }
            for (i, entry) in scores.iter().enumerate() {
                lines.push(format!("{:>2}. {:<12} {}s", i + 1, entry.name, entry.secs));
            }
            lines
        }
        Mode::Settings(menu) => {
            let mut lines = vec!["SETTINGS".to_string()];
            for (i, option) in SETTINGS_OPTIONS.iter().enumerate() {
                let cursor = if i == menu.selector.index() { ">" } else { " " };
                let value = settings_value(&menu.pending, option);
                lines.push(format!("{} {:<14}{}", cursor, option, value).trim_end().to_string());
            }
            lines
        }
    }
}

/// Character-grid surface
#[derive(Debug, Clone)]
pub struct AsciiSurface {
    width: i32,
    height: i32,
    cells: Vec<char>,
    lines: Vec<String>,
    overlay: f32,
}

impl AsciiSurface {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![' '; (width * height) as usize],
            lines: Vec::new(),
            overlay: 0.0,
        }
    }

    /// Reset for the next frame
    pub fn clear(&mut self) {
        self.cells.fill(' ');
        self.lines.clear();
        self.overlay = 0.0;
    }

    pub fn glyph_at(&self, pos: IVec2) -> Option<char> {
        valid(pos, self.width, self.height).then(|| self.cells[(pos.y * self.width + pos.x) as usize])
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn overlay_alpha(&self) -> f32 {
        self.overlay
    }

    /// Board rows followed by the text lines; the board is shaded past half opacity
    pub fn frame(&self) -> String {
        let mut out = String::new();
        if self.width > 0 {
            for row in self.cells.chunks(self.width as usize) {
                if row.iter().all(|c| *c == ' ') {
                    continue;
                }
                for c in row {
                    out.push(if self.overlay >= 0.5 { ':' } else { *c });
                }
                out.push('\n');
            }
        }
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl Surface for AsciiSurface {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn fill_cell(&mut self, pos: IVec2, tile: Tile, _color: Rgb) {
        if valid(pos, self.width, self.height) {
            self.cells[(pos.y * self.width + pos.x) as usize] = tile.glyph();
        }
    }

    fn text(&mut self, line: usize, text: &str) {
        if self.lines.len() <= line {
            self.lines.resize(line + 1, String::new());
        }
        self.lines[line] = text.to_string();
    }

    fn overlay(&mut self, alpha: f32) {
        self.overlay = alpha.clamp(0.0, 1.0);
    }
}
