//! Bomber Quest entry point
//!
//! Headless driver: builds the game, scripts the menus into a Medium round and
//! runs the fixed-cadence loop, printing an ASCII frame once per second.

use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

use bomber_quest::consts::*;
use bomber_quest::input::KeyCode;
use bomber_quest::render::{AsciiSurface, render};
use bomber_quest::sim::SimConfig;
use bomber_quest::{Game, GameEvent, Leaderboard, ModeKind, Settings};

const LEADERBOARD_FILE: &str = "leaderboard.dat";
const SETTINGS_FILE: &str = "settings.json";

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Maximum number of ticks to simulate
    #[arg(default_value_t = 1800)]
    ticks: u64,
    /// Fixed map seed (random when omitted)
    #[arg(short, long)]
    seed: Option<u64>,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    log::info!("Bomber Quest (headless) starting...");
    let budget = args.ticks;

    let settings = Settings::load_from(Path::new(SETTINGS_FILE)).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable settings: {}", e);
        Settings::default()
    });
    let leaderboard = Leaderboard::open(LEADERBOARD_FILE).unwrap_or_else(|e| {
        log::warn!("Leaderboard unavailable, scores will not persist: {}", e);
        Leaderboard::in_memory()
    });
    match leaderboard.path() {
        Some(path) => log::info!("Leaderboard file: {}", path.display()),
        None => log::info!("Leaderboard kept in memory"),
    }

    let config = SimConfig {
        seed: args.seed,
        ..Default::default()
    };
    let mut game = match Game::new(config, settings, leaderboard) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Start Game, then confirm the default (Medium) difficulty once the menu is up
    let script = [(0, KeyCode::ENTER), (u64::from(TRANSITION_TICKS) + 1, KeyCode::ENTER)];
    let (width, height) = (game.round().config.width, game.round().config.height);
    let mut surface = AsciiSurface::new(width, height);
    let frame_time = Duration::from_secs_f64(1.0 / f64::from(TICK_RATE));

    for t in 0..budget {
        for (_, key) in script.iter().filter(|(at, _)| *at == t) {
            game.key_down(*key);
            game.key_up(*key);
        }

        game.tick();

        for event in game.drain_events() {
            match event {
                GameEvent::ExitRequested => {
                    log::info!("Exit requested");
                    return ExitCode::SUCCESS;
                }
                GameEvent::SettingsApplied(settings) => {
                    if let Err(e) = settings.save_to(Path::new(SETTINGS_FILE)) {
                        log::warn!("Could not save settings: {}", e);
                    }
                }
                other => log::info!("Event: {:?}", other),
            }
        }

        let finished = matches!(game.mode_kind(), ModeKind::GameOver | ModeKind::Victory)
            && !game.transitions().is_transitioning();
        if t % u64::from(TICK_RATE) == 0 || finished {
            surface.clear();
            render(&mut surface, &game);
            println!("{}", surface.frame());
        }
        if finished {
            log::info!("Round over after {} ticks: {:?}", t + 1, game.mode_kind());
            return ExitCode::SUCCESS;
        }

        thread::sleep(frame_time);
    }

    log::info!("Tick budget of {} exhausted", budget);
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() -> ExitCode {
    // No headless driver on the web
    ExitCode::SUCCESS
}
