//! Top-level mode machine
//!
//! `Game` owns everything: the round, settings, leaderboard and the transition
//! sequencer. Mode changes are always requested through the transition manager
//! and applied at its midpoint; side effects for the front end (music, sounds,
//! applied settings, exit) are queued in an outbox drained once per tick.

use serde::{Deserialize, Serialize};

use crate::Direction;
use crate::consts::MAX_NAME_LEN;
use crate::error::GameResult;
use crate::input::{Action, KeyCode, KeyMap};
use crate::leaderboard::{Leaderboard, SubmitOutcome};
use crate::settings::Settings;
use crate::sim::{Difficulty, Round, RoundOutcome, SimConfig, TickInput, place_bomb, tick};
use crate::transition::{TransitionManager, TransitionStyle};

pub const MAIN_MENU_OPTIONS: [&str; 4] = ["Start Game", "Leaderboard", "Settings", "Exit"];
pub const PAUSE_OPTIONS: [&str; 4] = ["Resume", "Settings", "Main Menu", "Exit"];
pub const SETTINGS_OPTIONS: [&str; 8] = [
    "Resolution",
    "Fullscreen",
    "Music Vol",
    "SFX Vol",
    "Retro Effects",
    "Show FPS",
    "Apply",
    "Back",
];

pub const NAME_TAKEN_MESSAGE: &str = "Name already taken! Choose another.";

/// Background music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Track {
    Menu,
    Game,
}

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sfx {
    BombPlaced,
    Explosion,
    PlayerHurt,
    PowerUp,
    Victory,
}

/// Side effects for the driver, drained once per tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayMusic(Track),
    Sound(Sfx),
    SettingsApplied(Settings),
    ExitRequested,
}

/// Mode identifiers (no substate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeKind {
    MainMenu,
    DifficultySelect,
    Playing,
    GameOver,
    Victory,
    Leaderboard,
    Settings,
}

/// Menu cursor that wraps at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    index: usize,
    len: usize,
}

impl Selector {
    pub fn new(len: usize) -> Self {
        Self::with_index(len, 0)
    }

    pub fn with_index(len: usize, index: usize) -> Self {
        let len = len.max(1);
        Self {
            index: index.min(len - 1),
            len,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn up(&mut self) {
        self.index = (self.index + self.len - 1) % self.len;
    }

    pub fn down(&mut self) {
        self.index = (self.index + 1) % self.len;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainMenu {
    pub selector: Selector,
    /// Exit confirmation dialog is open
    pub confirm_exit: bool,
}

impl Default for MainMenu {
    fn default() -> Self {
        Self {
            selector: Selector::new(MAIN_MENU_OPTIONS.len()),
            confirm_exit: false,
        }
    }
}

/// Playing substate; pause lives here rather than as its own mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playing {
    /// Physically held keys; two keys bound to one direction are tracked apart
    held: Vec<KeyCode>,
    /// Pause menu cursor while paused
    pub pause: Option<Selector>,
}

impl Playing {
    pub fn is_paused(&self) -> bool {
        self.pause.is_some()
    }

    /// Held direction, prioritized up, down, left, right
    pub fn direction(&self, keys: &KeyMap) -> Option<Direction> {
        let held: Vec<Direction> = self
            .held
            .iter()
            .filter_map(|key| match keys.action(*key) {
                Some(Action::Move(dir)) => Some(dir),
                _ => None,
            })
            .collect();
        Direction::ALL.into_iter().find(|d| held.contains(d))
    }

    fn press(&mut self, key: KeyCode) {
        if !self.held.contains(&key) {
            self.held.push(key);
        }
    }

    fn release(&mut self, key: KeyCode) {
        self.held.retain(|k| *k != key);
    }

    fn toggle_pause(&mut self) {
        self.held.clear();
        self.pause = match self.pause {
            Some(_) => None,
            None => Some(Selector::new(PAUSE_OPTIONS.len())),
        };
    }
}

/// Victory substate: time display and name entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Victory {
    pub elapsed_secs: u64,
    pub name: String,
    pub saved: bool,
    pub error: Option<String>,
}

impl Victory {
    fn new(elapsed_secs: u64) -> Self {
        Self {
            elapsed_secs,
            name: String::new(),
            saved: false,
            error: None,
        }
    }
}

/// Settings substate; edits stay pending until applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsMenu {
    pub selector: Selector,
    pub pending: Settings,
}

/// The active mode and its substate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    MainMenu(MainMenu),
    DifficultySelect(Selector),
    Playing(Playing),
    GameOver,
    Victory(Victory),
    Leaderboard,
    Settings(SettingsMenu),
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::MainMenu(_) => ModeKind::MainMenu,
            Mode::DifficultySelect(_) => ModeKind::DifficultySelect,
            Mode::Playing(_) => ModeKind::Playing,
            Mode::GameOver => ModeKind::GameOver,
            Mode::Victory(_) => ModeKind::Victory,
            Mode::Leaderboard => ModeKind::Leaderboard,
            Mode::Settings(_) => ModeKind::Settings,
        }
    }
}

/// Pending mode change carried by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Goto(ModeKind),
    /// Build a fresh round at this difficulty, then play it
    NewRound(Difficulty),
}

/// Complete game context
#[derive(Debug)]
pub struct Game {
    mode: Mode,
    round: Round,
    difficulty: Difficulty,
    settings: Settings,
    leaderboard: Leaderboard,
    keys: KeyMap,
    transitions: TransitionManager<Request>,
    /// Mode to return to from Settings/Leaderboard (never Settings itself)
    previous: Option<ModeKind>,
    /// Paused round parked while Settings is open
    suspended: Option<Playing>,
    return_to_pause: bool,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: SimConfig, settings: Settings, leaderboard: Leaderboard) -> GameResult<Self> {
        let round = Round::new(config)?;
        Ok(Self {
            mode: Mode::MainMenu(MainMenu::default()),
            round,
            difficulty: Difficulty::default(),
            settings,
            leaderboard,
            keys: KeyMap::default(),
            transitions: TransitionManager::default(),
            previous: None,
            suspended: None,
            return_to_pause: false,
            events: vec![GameEvent::PlayMusic(Track::Menu)],
        })
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Takes effect on the next round (and on enemy speed immediately)
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.round.difficulty = difficulty;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn transitions(&self) -> &TransitionManager<Request> {
        &self.transitions
    }

    pub fn previous(&self) -> Option<ModeKind> {
        self.previous
    }

    /// Take every queued side effect
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Request a mode change; ignored while a transition is running
    pub fn goto(&mut self, target: ModeKind, style: TransitionStyle) -> bool {
        self.request(Request::Goto(target), style)
    }

    /// Go back to the recorded previous mode (main menu if none)
    pub fn return_to_previous(&mut self) -> bool {
        let target = self.previous.unwrap_or(ModeKind::MainMenu);
        self.goto(target, TransitionStyle::SlideRight)
    }

    fn request(&mut self, request: Request, style: TransitionStyle) -> bool {
        let accepted = self.transitions.request(request, style);
        if !accepted {
            log::debug!("Dropped {:?} (transition in progress)", request);
        }
        accepted
    }

    /// Advance one tick
    pub fn tick(&mut self) {
        if let Some(request) = self.transitions.update() {
            self.apply(request);
        }
        if self.transitions.is_transitioning() {
            return;
        }

        let Mode::Playing(playing) = &self.mode else {
            return;
        };
        if playing.is_paused() {
            return;
        }
        let input = TickInput {
            direction: playing.direction(&self.keys),
        };

        let report = tick(&mut self.round, &input);
        if report.detonations > 0 {
            self.events.push(GameEvent::Sound(Sfx::Explosion));
        }
        if report.player_hits > 0 {
            self.events.push(GameEvent::Sound(Sfx::PlayerHurt));
        }
        if !report.collected.is_empty() {
            self.events.push(GameEvent::Sound(Sfx::PowerUp));
        }
        match report.outcome {
            RoundOutcome::Ongoing => {}
            RoundOutcome::Defeat => {
                log::info!("Round lost after {} ticks", self.round.ticks);
                self.goto(ModeKind::GameOver, TransitionStyle::Fade);
            }
            RoundOutcome::Victory { .. } => {
                self.events.push(GameEvent::Sound(Sfx::Victory));
                self.goto(ModeKind::Victory, TransitionStyle::Fade);
            }
        }
    }

    /// Midpoint swap: tear down the outgoing mode and set up the incoming one
    fn apply(&mut self, request: Request) {
        let outgoing = self.mode.kind();
        let (target, new_round) = match request {
            Request::Goto(kind) => (kind, None),
            Request::NewRound(difficulty) => (ModeKind::Playing, Some(difficulty)),
        };

        // Settings opened from the pause menu returns to the paused round
        if let Mode::Playing(playing) = &self.mode {
            if target == ModeKind::Settings && playing.is_paused() {
                self.return_to_pause = true;
                self.suspended = Some(playing.clone());
            }
        }
        if outgoing != ModeKind::Settings {
            self.previous = Some(outgoing);
        }

        self.mode = match target {
            ModeKind::MainMenu => {
                self.round.clear();
                self.suspended = None;
                self.return_to_pause = false;
                self.events.push(GameEvent::PlayMusic(Track::Menu));
                Mode::MainMenu(MainMenu::default())
            }
            ModeKind::DifficultySelect => {
                self.round.clear();
                self.suspended = None;
                self.return_to_pause = false;
                let current = Difficulty::ALL
                    .iter()
                    .position(|d| *d == self.difficulty)
                    .unwrap_or(1);
                Mode::DifficultySelect(Selector::with_index(Difficulty::ALL.len(), current))
            }
            ModeKind::Playing => match new_round {
                Some(difficulty) => {
                    self.suspended = None;
                    self.return_to_pause = false;
                    self.round.restart(difficulty);
                    self.events.push(GameEvent::PlayMusic(Track::Game));
                    Mode::Playing(Playing::default())
                }
                None => {
                    let resumed = if self.return_to_pause { self.suspended.take() } else { None };
                    self.return_to_pause = false;
                    Mode::Playing(resumed.unwrap_or_default())
                }
            },
            ModeKind::GameOver => Mode::GameOver,
            ModeKind::Victory => Mode::Victory(Victory::new(self.round.finished_secs.unwrap_or(0))),
            ModeKind::Leaderboard => Mode::Leaderboard,
            ModeKind::Settings => Mode::Settings(SettingsMenu {
                selector: Selector::new(SETTINGS_OPTIONS.len()),
                pending: self.settings.clone(),
            }),
        };
        log::info!("Mode {:?} -> {:?}", outgoing, target);
    }

    /// Key press from the front end; ignored while a transition is running
    pub fn key_down(&mut self, key: KeyCode) {
        if self.transitions.is_transitioning() {
            return;
        }
        let action = self.keys.action(key);

        match self.mode.kind() {
            ModeKind::MainMenu => self.main_menu_input(action),
            ModeKind::DifficultySelect => self.difficulty_input(action),
            ModeKind::Playing => self.playing_input(key, action),
            ModeKind::GameOver => match action {
                Some(Action::Confirm) => {
                    self.goto(ModeKind::DifficultySelect, TransitionStyle::Fade);
                }
                Some(Action::Cancel) => {
                    self.goto(ModeKind::MainMenu, TransitionStyle::Fade);
                }
                _ => {}
            },
            ModeKind::Victory => self.victory_input(key, action),
            ModeKind::Leaderboard => {
                if matches!(action, Some(Action::Cancel | Action::Confirm)) {
                    self.return_to_previous();
                }
            }
            ModeKind::Settings => self.settings_input(action),
        }
    }

    /// Key release; held movement is cleared even mid-transition
    pub fn key_up(&mut self, key: KeyCode) {
        if let Mode::Playing(playing) = &mut self.mode {
            playing.release(key);
        }
    }

    fn main_menu_input(&mut self, action: Option<Action>) {
        let Mode::MainMenu(menu) = &mut self.mode else {
            return;
        };

        if menu.confirm_exit {
            match action {
                Some(Action::Confirm) => self.events.push(GameEvent::ExitRequested),
                Some(Action::Cancel) => menu.confirm_exit = false,
                _ => {}
            }
            return;
        }

        match action {
            Some(Action::Move(Direction::Up)) => menu.selector.up(),
            Some(Action::Move(Direction::Down)) => menu.selector.down(),
            Some(Action::Confirm) => match menu.selector.index() {
                0 => {
                    self.goto(ModeKind::DifficultySelect, TransitionStyle::SlideLeft);
                }
                1 => {
                    self.goto(ModeKind::Leaderboard, TransitionStyle::SlideLeft);
                }
                2 => {
                    self.goto(ModeKind::Settings, TransitionStyle::SlideLeft);
                }
                _ => menu.confirm_exit = true,
            },
            _ => {}
        }
    }

    fn difficulty_input(&mut self, action: Option<Action>) {
        let Mode::DifficultySelect(selector) = &mut self.mode else {
            return;
        };
        match action {
            Some(Action::Move(Direction::Up)) => selector.up(),
            Some(Action::Move(Direction::Down)) => selector.down(),
            Some(Action::Confirm) => {
                let difficulty = Difficulty::ALL[selector.index()];
                self.set_difficulty(difficulty);
                self.request(Request::NewRound(difficulty), TransitionStyle::Zoom);
            }
            Some(Action::Cancel) => {
                self.goto(ModeKind::MainMenu, TransitionStyle::SlideRight);
            }
            _ => {}
        }
    }

    fn playing_input(&mut self, key: KeyCode, action: Option<Action>) {
        let Mode::Playing(playing) = &mut self.mode else {
            return;
        };

        if let Some(selector) = playing.pause.as_mut() {
            match action {
                Some(Action::Move(Direction::Up)) => selector.up(),
                Some(Action::Move(Direction::Down)) => selector.down(),
                Some(Action::Pause | Action::Cancel) => playing.toggle_pause(),
                Some(Action::Confirm) => match selector.index() {
                    0 => playing.toggle_pause(),
                    1 => {
                        self.goto(ModeKind::Settings, TransitionStyle::Fade);
                    }
                    2 => {
                        self.goto(ModeKind::MainMenu, TransitionStyle::Fade);
                    }
                    _ => self.events.push(GameEvent::ExitRequested),
                },
                _ => {}
            }
            return;
        }

        match action {
            Some(Action::Move(_)) => playing.press(key),
            Some(Action::Pause | Action::Cancel) => playing.toggle_pause(),
            Some(Action::PlaceBomb) => {
                if place_bomb(&mut self.round) {
                    self.events.push(GameEvent::Sound(Sfx::BombPlaced));
                }
            }
            _ => {}
        }
    }

    fn victory_input(&mut self, key: KeyCode, action: Option<Action>) {
        let Mode::Victory(victory) = &mut self.mode else {
            return;
        };

        if victory.saved {
            match action {
                Some(Action::Confirm) => {
                    self.goto(ModeKind::DifficultySelect, TransitionStyle::Fade);
                }
                Some(Action::Cancel) => {
                    self.goto(ModeKind::MainMenu, TransitionStyle::Fade);
                }
                _ => {}
            }
            return;
        }

        if let Some(c) = key.as_char() {
            if victory.name.chars().count() < MAX_NAME_LEN {
                victory.name.push(c);
            }
            return;
        }

        match action {
            Some(Action::Erase) => {
                victory.name.pop();
            }
            Some(Action::Confirm) => {
                let name = victory.name.trim().to_string();
                if name.is_empty() {
                    return;
                }
                match self.leaderboard.submit(&name, victory.elapsed_secs) {
                    Ok(SubmitOutcome::Saved { .. }) => {
                        victory.saved = true;
                        victory.error = None;
                    }
                    Ok(SubmitOutcome::NameTaken) => {
                        victory.error = Some(NAME_TAKEN_MESSAGE.to_string());
                    }
                    Err(e) => {
                        log::error!("Failed to save score: {}", e);
                        victory.error = Some(format!("Could not save score: {}", e));
                    }
                }
            }
            Some(Action::Cancel) => {
                self.goto(ModeKind::MainMenu, TransitionStyle::Fade);
            }
            _ => {}
        }
    }

    fn settings_input(&mut self, action: Option<Action>) {
        let Mode::Settings(menu) = &mut self.mode else {
            return;
        };
        let pending = &mut menu.pending;
        let option = SETTINGS_OPTIONS[menu.selector.index()];

        match action {
            Some(Action::Move(Direction::Up)) => menu.selector.up(),
            Some(Action::Move(Direction::Down)) => menu.selector.down(),
            Some(Action::Move(dir @ (Direction::Left | Direction::Right))) => {
                let forward = dir == Direction::Right;
                match option {
                    "Resolution" => pending.cycle_resolution(forward),
                    "Music Vol" => pending.music_volume = Settings::adjust_volume(pending.music_volume, forward),
                    "SFX Vol" => pending.sfx_volume = Settings::adjust_volume(pending.sfx_volume, forward),
                    _ => {}
                }
            }
            Some(Action::Confirm) => match option {
                "Resolution" => pending.cycle_resolution(true),
                "Fullscreen" => pending.fullscreen = !pending.fullscreen,
                "Retro Effects" => pending.retro_effects = !pending.retro_effects,
                "Show FPS" => pending.show_fps = !pending.show_fps,
                "Apply" => {
                    self.settings = pending.clone();
                    log::info!("Settings applied: {}", self.settings.resolution_label());
                    self.events.push(GameEvent::SettingsApplied(self.settings.clone()));
                }
                "Back" => {
                    self.return_to_previous();
                }
                _ => {}
            },
            Some(Action::Cancel) => {
                self.return_to_previous();
            }
            _ => {}
        }
    }
}
