//! Digivice main entry point.
//!
//! A handheld virtual-pet adventure written in Rust using:
//! - **raylib** for the desktop window
//! - **bevy_ecs** as the shared resource container
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (defaults when missing)
//! 2. Open the window and load sprites, backgrounds and the enemy roster
//! 3. Enter the adventure and run the fixed loop until quit
//! 4. Tear down states, textures and the window
//!
//! # Running
//!
//! ```sh
//! cargo run --release
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use digivice::resources::gameconfig::GameConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Digivice adventure runtime")]
struct Cli {}

#[cfg(feature = "raylib")]
fn run_game(config: GameConfig) -> Result<(), String> {
    use digivice::constants::WINDOW_TITLE;
    use digivice::display::raylib::RaylibDisplay;
    use digivice::game::Game;

    let (render_w, render_h) = config.render_size();
    let (window_w, window_h) = config.window_size();
    let mut game = Game::new(RaylibDisplay::new(render_w, render_h), config);
    game.init(WINDOW_TITLE, window_w, window_h)?;
    game.run();
    game.shutdown();
    Ok(())
}

#[cfg(not(feature = "raylib"))]
fn run_game(_config: GameConfig) -> Result<(), String> {
    Err("Built without a window driver, enable the `raylib` feature".to_string())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let _cli = Cli::parse();

    let mut config = GameConfig::new();
    if let Err(e) = config.load_from_file() {
        info!("Using default configuration: {}", e);
    }

    match run_game(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
