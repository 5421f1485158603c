//! Game orchestrator.
//!
//! [`Game`] owns the display, the resource [`World`] and the active
//! [`GameState`]. One call to [`Game::frame`] is one loop iteration:
//!
//! 1. compute the clamped frame delta (zero on the first frame)
//! 2. drain host events into the state as actions
//! 3. stop here if a quit was requested
//! 4. update the state
//! 5. `begin_frame`, render the state, `end_frame`
//! 6. apply a pending state swap
//!
//! An encounter is pushed over the adventure: the adventure is suspended
//! untouched and resumed when the encounter asks for
//! [`GameStates::Adventure`].
//!
//! [`Game::run`] repeats this against a monotonic clock and sleeps to the
//! target frame rate.

use std::path::Path;
use std::time::{Duration, Instant};

use bevy_ecs::prelude::*;
use log::{debug, info, warn};

use crate::components::digimon::Digimon;
use crate::constants::{BACKGROUND_COLOR, FALLBACK_SPRITE_ID, MAX_FRAME_DELTA};
use crate::display::Display;
use crate::resources::animationstore::AnimationStore;
use crate::resources::backgrounds::{BackgroundSelection, LayerKind};
use crate::resources::encounter::{CombatantRoster, EncounterRng};
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamestate::{GameStates, NextGameState};
use crate::resources::input::{GameAction, InputMap, Scancode};
use crate::resources::playerdata::PlayerData;
use crate::resources::texturestore::{Atlas, TextureStore};
use crate::resources::windowsize::WindowSize;
use crate::resources::worldtime::WorldTime;
use crate::states::adventure::AdventureState;
use crate::states::{GameState, build_state};
use crate::systems::input::{FrameInput, translate_event};
use crate::systems::time::update_world_time;

pub struct Game<D: Display> {
    display: D,
    world: World,
    state: Option<Box<dyn GameState>>,
    /// States covered by the active one, innermost last.
    suspended: Vec<Box<dyn GameState>>,
    pending: Option<Box<dyn GameState>>,
    running: bool,
    last_frame_ms: Option<u64>,
    torn_down: bool,
}

impl<D: Display> Game<D> {
    /// Create an orchestrator around `display`. Nothing is opened until
    /// [`Game::init`].
    pub fn new(display: D, config: GameConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(config);
        Self {
            display,
            world,
            state: None,
            suspended: Vec::new(),
            pending: None,
            running: false,
            last_frame_ms: None,
            torn_down: false,
        }
    }

    /// Open the display, load assets and enter the adventure.
    pub fn init(&mut self, title: &str, width: u32, height: u32) -> Result<(), String> {
        self.display
            .init(title, width, height)
            .map_err(|e| format!("Failed to initialize display: {}", e))?;

        let config = self.world.resource::<GameConfig>().clone();
        if !config.asset_root.is_dir() {
            self.display.close();
            return Err(format!(
                "Asset root {} does not exist",
                config.asset_root.display()
            ));
        }

        let encounter_rng = EncounterRng::from_config(&config);
        let mut variant_rng = fastrand::Rng::with_seed(encounter_rng.seed().wrapping_add(1));
        let backgrounds =
            BackgroundSelection::choose(&config.asset_root, &config.environment, &mut variant_rng);
        let roster =
            CombatantRoster::load_or_default(&config.asset_root.join("data/combatants.json"));
        let textures = load_textures(&config.asset_root, &backgrounds, &roster);
        let mut animations = AnimationStore::with_defaults(&textures);
        animations.add_combatants(&textures, &roster.combatants);
        let input_map = InputMap::from_store(&config);
        let (window_w, window_h) = self.display.window_size();

        self.world
            .insert_resource(WorldTime::default().with_time_scale(1.0));
        self.world.insert_resource(textures);
        self.world.insert_resource(animations);
        self.world.insert_resource(backgrounds);
        self.world.insert_resource(roster);
        self.world.insert_resource(encounter_rng);
        self.world.insert_resource(input_map);
        self.world.insert_resource(NextGameState::new());
        self.world.init_resource::<PlayerData>();
        self.world.insert_resource(WindowSize {
            w: window_w,
            h: window_h,
        });

        let mut state: Box<dyn GameState> = Box::new(AdventureState::new(&self.world));
        state.enter(&mut self.world);
        self.state = Some(state);
        self.running = true;
        self.last_frame_ms = None;
        info!("Game initialized");
        Ok(())
    }

    /// Run the loop until a quit is requested.
    pub fn run(&mut self) {
        let target_fps = self.world.resource::<GameConfig>().target_fps.max(1);
        let frame_budget = Duration::from_secs_f64(1.0 / target_fps as f64);
        let start = Instant::now();
        while self.running {
            let frame_start = Instant::now();
            let now_ms = start.elapsed().as_millis() as u64;
            if !self.frame(now_ms) {
                break;
            }
            let spent = frame_start.elapsed();
            if spent < frame_budget {
                std::thread::sleep(frame_budget - spent);
            }
        }
        info!("Main loop finished");
    }

    /// One loop iteration at monotonic time `now_ms`. Returns whether the
    /// loop should keep going.
    pub fn frame(&mut self, now_ms: u64) -> bool {
        if !self.running {
            return false;
        }

        let dt = match self.last_frame_ms {
            Some(last) => (now_ms.saturating_sub(last) as f32 / 1000.0).min(MAX_FRAME_DELTA),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        for event in self.display.poll_events() {
            let input = translate_event(self.world.resource::<InputMap>(), event);
            match input {
                Some(FrameInput::Quit) => {
                    info!("Quit requested");
                    self.running = false;
                }
                Some(FrameInput::Resized { width, height }) => {
                    debug!("Window resized to {}x{}", width, height);
                    self.world.insert_resource(WindowSize {
                        w: width,
                        h: height,
                    });
                }
                Some(FrameInput::Action(action)) => {
                    if let Some(state) = self.state.as_mut() {
                        state.handle_input(&mut self.world, action);
                    }
                }
                None => {}
            }
        }
        if !self.running {
            return false;
        }

        let scaled_dt = update_world_time(&mut self.world, dt);
        if let Some(state) = self.state.as_mut() {
            state.update(&mut self.world, scaled_dt);
        }

        self.display.begin_frame(BACKGROUND_COLOR);
        if let Some(state) = self.state.as_ref() {
            state.render(&self.world, &mut self.display);
        }
        if let Err(e) = self.display.end_frame() {
            warn!("Failed to present frame: {}", e);
        }

        let (w, h) = self.display.window_size();
        {
            let mut window_size = self.world.resource_mut::<WindowSize>();
            window_size.w = w;
            window_size.h = h;
        }

        self.apply_pending_state();
        self.running
    }

    /// Swap in a pending state, if one was requested this frame.
    fn apply_pending_state(&mut self) {
        let request = self.world.resource_mut::<NextGameState>().take();
        if let Some(state) = self.pending.take() {
            let from = self.exit_active();
            self.activate(from, Some(state));
            return;
        }
        let Some(request) = request else {
            return;
        };

        match request {
            GameStates::Quitting => {
                info!("Quitting");
                self.running = false;
            }
            GameStates::Encounter(_) => {
                if let Some(next) = build_state(request, &mut self.world) {
                    self.push_state(next);
                }
            }
            GameStates::Adventure if !self.suspended.is_empty() => self.pop_state(),
            request => {
                let from = self.exit_active();
                let next = build_state(request, &mut self.world);
                self.activate(from, next);
            }
        }
    }

    /// Exit and drop the active state, returning its name.
    fn exit_active(&mut self) -> &'static str {
        match self.state.take() {
            Some(mut old) => {
                old.exit(&mut self.world);
                old.name()
            }
            None => "none",
        }
    }

    fn activate(&mut self, from: &'static str, next: Option<Box<dyn GameState>>) {
        if let Some(mut next) = next {
            next.enter(&mut self.world);
            info!("State {} -> {}", from, next.name());
            self.state = Some(next);
        }
    }

    /// Suspend the active state and enter `next` on top of it.
    fn push_state(&mut self, mut next: Box<dyn GameState>) {
        let from = match self.state.take() {
            Some(mut current) => {
                current.suspend(&mut self.world);
                let name = current.name();
                self.suspended.push(current);
                name
            }
            None => "none",
        };
        next.enter(&mut self.world);
        info!(
            "State {} suspended under {} (depth {})",
            from,
            next.name(),
            self.suspended.len()
        );
        self.state = Some(next);
    }

    /// Exit the active state and resume the one below it.
    fn pop_state(&mut self) {
        let from = self.exit_active();
        if let Some(mut resumed) = self.suspended.pop() {
            resumed.resume(&mut self.world);
            info!("State {} -> {} (resumed)", from, resumed.name());
            self.state = Some(resumed);
        }
    }

    /// Replace the active state at the end of the current frame. Takes
    /// precedence over a request made through [`NextGameState`].
    pub fn change_state(&mut self, state: Box<dyn GameState>) {
        self.pending = Some(state);
    }

    /// Stop the loop at the top of the next iteration.
    pub fn quit_game(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn state(&self) -> Option<&dyn GameState> {
        self.state.as_deref()
    }

    /// States suspended under the active one, innermost last.
    pub fn suspended_states(&self) -> impl Iterator<Item = &dyn GameState> {
        self.suspended.iter().map(|s| s.as_ref())
    }

    /// Active state downcast to its concrete type.
    pub fn state_as<S: GameState + 'static>(&self) -> Option<&S> {
        self.state.as_ref()?.as_any().downcast_ref::<S>()
    }

    /// Rebind `action` to `key` and persist the binding to the config file.
    pub fn rebind_action(&mut self, action: GameAction, key: Scancode) -> bool {
        self.world
            .resource_scope(|world, mut map: Mut<InputMap>| {
                let mut config = world.resource_mut::<GameConfig>();
                map.rebind(action, key, &mut *config)
            })
    }

    /// Tear down in reverse order: states (active first), textures, display.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.running = false;
        self.pending = None;
        if let Some(mut state) = self.state.take() {
            state.exit(&mut self.world);
        }
        while let Some(mut state) = self.suspended.pop() {
            state.exit(&mut self.world);
        }
        if let Some(mut textures) = self.world.get_resource_mut::<TextureStore>() {
            textures.clear();
        }
        self.display.close();
        info!("Game shut down");
    }
}

impl<D: Display> Drop for Game<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn load_textures(
    root: &Path,
    backgrounds: &BackgroundSelection,
    roster: &CombatantRoster,
) -> TextureStore {
    let mut textures = TextureStore::new();
    let sprites = root.join("sprites");
    let mut sheet_ids: Vec<&str> = Digimon::ALL.iter().map(|d| d.id()).collect();
    for combatant in &roster.combatants {
        let id = combatant.sprite_id.as_str();
        if id != FALLBACK_SPRITE_ID && !sheet_ids.contains(&id) {
            sheet_ids.push(id);
        }
    }
    for id in sheet_ids {
        textures.load(id, &sprites.join(format!("{}_sheet.png", id)));
    }

    for layer in LayerKind::ALL {
        let id = backgrounds.texture_id(layer);
        match &backgrounds.layers[layer.index()] {
            Some(path) => {
                textures.load_or(&id, path, Atlas::striped_background);
            }
            None => {
                warn!("No '{}' background variant found, using placeholder", id);
                textures.insert(id, Atlas::striped_background());
            }
        }
    }
    textures
}
