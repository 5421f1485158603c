//! Game configuration resource.
//!
//! Manages game settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration. The
//! `[input]` section doubles as the persisted key-binding table.
//!
//! # Configuration File Format
//!
//! ```ini
//! [render]
//! width = 466
//! height = 466
//!
//! [window]
//! width = 932
//! height = 932
//! target_fps = 60
//!
//! [assets]
//! root = assets
//!
//! [adventure]
//! encounter_probability = 0.15
//! rng_seed = 1234
//! environment = tropicaljungle
//!
//! [input]
//! step = Space
//! nav_up = Up,W
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;

use crate::constants::{
    DEFAULT_ENCOUNTER_PROBABILITY, DEFAULT_TARGET_FPS, NATIVE_HEIGHT, NATIVE_WIDTH,
};
use crate::resources::input::{GameAction, KeyBindingStore};

/// Default safe values for startup
const DEFAULT_CONFIG_PATH: &str = "./config.ini";
const DEFAULT_ASSET_ROOT: &str = "assets";
const DEFAULT_ENVIRONMENT: &str = "tropicaljungle";

/// Game configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Internal render width in pixels.
    pub render_width: u32,
    /// Internal render height in pixels.
    pub render_height: u32,
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Target frames per second.
    pub target_fps: u32,
    /// Directory holding sprites, backgrounds and data files.
    pub asset_root: PathBuf,
    /// Chance that an encounter roll starts a battle.
    pub encounter_probability: f32,
    /// Seed for the encounter RNG; `None` seeds from the clock.
    pub rng_seed: Option<u64>,
    /// Background environment of the adventure.
    pub environment: String,
    /// Raw `[input]` entries: action name to key names.
    pub key_bindings: BTreeMap<String, String>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            render_width: NATIVE_WIDTH,
            render_height: NATIVE_HEIGHT,
            window_width: NATIVE_WIDTH,
            window_height: NATIVE_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            encounter_probability: DEFAULT_ENCOUNTER_PROBABILITY,
            rng_seed: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            key_bindings: BTreeMap::new(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [render] section
        if let Some(width) = config.getuint("render", "width").ok().flatten() {
            self.render_width = width as u32;
        }
        if let Some(height) = config.getuint("render", "height").ok().flatten() {
            self.render_height = height as u32;
        }

        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }

        // [assets] section
        if let Some(root) = config.get("assets", "root") {
            self.asset_root = PathBuf::from(root);
        }

        // [adventure] section
        if let Some(p) = config
            .getfloat("adventure", "encounter_probability")
            .ok()
            .flatten()
        {
            self.encounter_probability = (p as f32).clamp(0.0, 1.0);
        }
        if let Some(seed) = config.getuint("adventure", "rng_seed").ok().flatten() {
            self.rng_seed = Some(seed);
        }
        if let Some(env) = config.get("adventure", "environment") {
            self.environment = env;
        }

        // [input] section
        for action in GameAction::ALL {
            if let Some(value) = config.get("input", action.name()) {
                self.key_bindings.insert(action.name().to_string(), value);
            }
        }

        info!(
            "Loaded config: {}x{} render, {}x{} window, fps={}, assets={:?}, p_encounter={}, {} key bindings",
            self.render_width,
            self.render_height,
            self.window_width,
            self.window_height,
            self.target_fps,
            self.asset_root,
            self.encounter_probability,
            self.key_bindings.len()
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [render] section
        config.set("render", "width", Some(self.render_width.to_string()));
        config.set("render", "height", Some(self.render_height.to_string()));

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));

        // [assets] section
        config.set(
            "assets",
            "root",
            Some(self.asset_root.to_string_lossy().into_owned()),
        );

        // [adventure] section
        config.set(
            "adventure",
            "encounter_probability",
            Some(self.encounter_probability.to_string()),
        );
        if let Some(seed) = self.rng_seed {
            config.set("adventure", "rng_seed", Some(seed.to_string()));
        }
        config.set("adventure", "environment", Some(self.environment.clone()));

        // [input] section
        for (action, keys) in &self.key_bindings {
            config.set("input", action, Some(keys.clone()));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Get the native render size.
    pub fn render_size(&self) -> (u32, u32) {
        (self.render_width, self.render_height)
    }
}

impl KeyBindingStore for GameConfig {
    fn binding_entry(&self, action: &str) -> Option<String> {
        self.key_bindings.get(action).cloned()
    }

    fn persist_bindings(&mut self, entries: &[(&'static str, String)]) -> Result<(), String> {
        self.key_bindings = entries
            .iter()
            .map(|(action, keys)| (action.to_string(), keys.clone()))
            .collect();
        self.save_to_file()
    }
}
