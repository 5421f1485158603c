//! Orchestrator behavior against the headless display.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::*;

use digivice::components::digimon::Digimon;
use digivice::constants::{CHAPTER_STEP_GOAL, NATIVE_HEIGHT, NATIVE_WIDTH};
use digivice::display::Display;
use digivice::display::headless::HeadlessDisplay;
use digivice::events::input::HostEvent;
use digivice::game::Game;
use digivice::resources::animationstore::AnimationStore;
use digivice::resources::encounter::{CombatantRoster, EncounterRng};
use digivice::resources::gameconfig::GameConfig;
use digivice::resources::gamestate::{GameStates, NextGameState};
use digivice::resources::input::{GameAction, InputMap, Scancode};
use digivice::resources::playerdata::PlayerData;
use digivice::resources::texturestore::TextureStore;
use digivice::resources::windowsize::WindowSize;
use digivice::resources::worldtime::WorldTime;
use digivice::states::GameState;
use digivice::states::adventure::{AdventureState, PlayerState};
use digivice::states::encounter::{EncounterPhase, EncounterState};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("digivice_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn make_config(name: &str) -> GameConfig {
    let dir = temp_dir(name);
    let mut config = GameConfig::with_path(dir.join("config.ini"));
    config.asset_root = dir.join("assets");
    std::fs::create_dir_all(&config.asset_root).unwrap();
    config.rng_seed = Some(1);
    config.encounter_probability = 0.0;
    config
}

fn make_game(name: &str) -> Game<HeadlessDisplay> {
    let mut game = Game::new(
        HeadlessDisplay::new(NATIVE_WIDTH, NATIVE_HEIGHT),
        make_config(name),
    );
    game.init("Digivice", NATIVE_WIDTH, NATIVE_HEIGHT).unwrap();
    game
}

fn steps(game: &Game<HeadlessDisplay>) -> u32 {
    game.world().resource::<PlayerData>().steps_this_chapter
}

fn total_steps(game: &Game<HeadlessDisplay>) -> u64 {
    game.world().resource::<PlayerData>().total_steps
}

/// Press Space and run frames until the adventure booked the step.
///
/// Waits on the lifetime counter, which keeps growing across a chapter
/// rollover.
fn step_once(game: &mut Game<HeadlessDisplay>, now: &mut u64) {
    let before = total_steps(game);
    game.display_mut()
        .push_event(HostEvent::KeyDown(Scancode::Space));
    for _ in 0..20 {
        *now += 100;
        assert!(game.frame(*now));
        if total_steps(game) > before {
            return;
        }
    }
    panic!("step did not complete");
}

fn suspended_adventure(game: &Game<HeadlessDisplay>) -> Option<&AdventureState> {
    game.suspended_states()
        .last()
        .and_then(|state| state.as_any().downcast_ref::<AdventureState>())
}

struct RecordingState {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingState {
    fn boxed(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Box<dyn GameState> {
        Box::new(Self {
            name,
            log: log.clone(),
        })
    }

    fn push(&self, what: &str) {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", what, self.name));
    }
}

impl GameState for RecordingState {
    fn name(&self) -> &'static str {
        self.name
    }

    fn enter(&mut self, _world: &mut World) {
        self.push("enter");
    }

    fn exit(&mut self, _world: &mut World) {
        self.push("exit");
    }

    fn handle_input(&mut self, _world: &mut World, action: GameAction) {
        self.push(action.name());
    }

    fn update(&mut self, _world: &mut World, _dt: f32) {
        self.push("update");
    }

    fn render(&self, _world: &World, _display: &mut dyn Display) {}

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[test]
fn test_init_enters_adventure() {
    let game = make_game("init");
    assert!(game.is_running());
    assert!(game.display().is_initialized());
    assert_eq!(game.display().title(), "Digivice");
    assert_eq!(game.state().map(|s| s.name()), Some("adventure"));
    let adventure = game.state_as::<AdventureState>().unwrap();
    assert_eq!(adventure.player_state(), PlayerState::Idle);
    assert_eq!(adventure.current_digimon(), Digimon::Agumon);
}

#[test]
fn test_init_fails_when_display_fails() {
    let mut game = Game::new(
        HeadlessDisplay::new(NATIVE_WIDTH, NATIVE_HEIGHT).with_init_failure(),
        make_config("display_fail"),
    );
    assert!(game.init("Digivice", 466, 466).is_err());
    assert!(!game.is_running());
    assert!(!game.frame(0));
    game.run();
}

#[test]
fn test_init_fails_without_asset_root() {
    let mut config = make_config("no_assets");
    config.asset_root = config.asset_root.join("missing");
    let mut game = Game::new(HeadlessDisplay::new(NATIVE_WIDTH, NATIVE_HEIGHT), config);
    let err = game.init("Digivice", 466, 466).unwrap_err();
    assert!(err.contains("does not exist"));
    assert!(!game.display().is_initialized());
    assert!(!game.is_running());
}

#[test]
fn test_first_frame_has_zero_delta_and_deltas_are_clamped() {
    let mut game = make_game("delta");
    assert!(game.frame(5_000));
    assert_eq!(game.world().resource::<WorldTime>().delta, 0.0);
    assert!(game.frame(5_050));
    assert!((game.world().resource::<WorldTime>().delta - 0.05).abs() < 1e-6);
    assert!(game.frame(9_000));
    assert!((game.world().resource::<WorldTime>().delta - 0.1).abs() < 1e-6);
    assert_eq!(game.world().resource::<WorldTime>().frame_count, 3);
    assert_eq!(game.display().frames_presented(), 3);
}

#[test]
fn test_quit_event_stops_before_update() {
    let mut game = make_game("quit_event");
    assert!(game.frame(0));
    game.display_mut().push_event(HostEvent::Quit);
    assert!(!game.frame(100));
    assert!(!game.is_running());
    assert_eq!(game.world().resource::<WorldTime>().frame_count, 1);
    assert_eq!(game.display().frames_presented(), 1);
    assert!(!game.frame(200));
}

#[test]
fn test_quit_action_and_quit_game() {
    let mut game = make_game("quit_action");
    game.display_mut().push_event(HostEvent::KeyDown(Scancode::Q));
    assert!(!game.frame(0));

    let mut game = make_game("quit_game");
    game.quit_game();
    assert!(!game.frame(0));
    game.run();
}

#[test]
fn test_change_state_is_deferred_and_exit_precedes_enter() {
    let mut game = make_game("swap");
    let log = Arc::new(Mutex::new(Vec::new()));

    game.change_state(RecordingState::boxed("a", &log));
    assert_eq!(game.state().map(|s| s.name()), Some("adventure"));
    assert!(game.frame(0));
    assert_eq!(game.state().map(|s| s.name()), Some("a"));

    game.change_state(RecordingState::boxed("b", &log));
    game.display_mut()
        .push_event(HostEvent::KeyDown(Scancode::Return));
    assert!(game.frame(100));
    assert_eq!(game.state().map(|s| s.name()), Some("b"));

    let log = log.lock().unwrap().clone();
    assert_eq!(
        log,
        vec!["enter:a", "confirm:a", "update:a", "exit:a", "enter:b"]
    );
}

#[test]
fn test_present_failure_keeps_running() {
    let mut game = make_game("present_fail");
    game.display_mut().set_present_failure(true);
    assert!(game.frame(0));
    assert!(game.frame(100));
    assert_eq!(game.display().frames_presented(), 0);
    game.display_mut().set_present_failure(false);
    assert!(game.frame(200));
    assert_eq!(game.display().frames_presented(), 1);
}

#[test]
fn test_step_key_walks_partner() {
    let mut game = make_game("step");
    let mut now = 0;
    assert!(game.frame(now));
    step_once(&mut game, &mut now);
    assert_eq!(steps(&game), 1);
    let adventure = game.state_as::<AdventureState>().unwrap();
    assert_eq!(adventure.player_state(), PlayerState::Idle);
    assert!(adventure.layer_offsets()[0] > 0.0);
}

#[test]
fn test_encounter_and_return() {
    let mut game = make_game("encounter");
    game.world_mut().insert_resource(EncounterRng::new(7, 1.0));
    let mut now = 0;
    assert!(game.frame(now));
    for _ in 0..5 {
        step_once(&mut game, &mut now);
    }
    assert_eq!(game.state().map(|s| s.name()), Some("encounter"));
    assert_eq!(
        game.state_as::<EncounterState>().unwrap().enemy().name,
        "Kuwagamon"
    );

    while game.state_as::<EncounterState>().unwrap().phase() != EncounterPhase::Ready {
        now += 100;
        assert!(game.frame(now));
        assert!(now < 10_000, "encounter never became ready");
    }
    game.display_mut()
        .push_event(HostEvent::KeyDown(Scancode::Return));
    now += 100;
    assert!(game.frame(now));

    assert_eq!(game.state().map(|s| s.name()), Some("adventure"));
    let adventure = game.state_as::<AdventureState>().unwrap();
    assert_eq!(adventure.steps_taken_this_chapter(), 5);
    assert_eq!(adventure.player_state(), PlayerState::Idle);
    assert_eq!(game.suspended_states().count(), 0);
}

#[test]
fn test_adventure_resumes_where_it_left_off() {
    let mut game = make_game("resume");
    game.world_mut().insert_resource(EncounterRng::new(7, 1.0));
    let mut now = 0;
    assert!(game.frame(now));
    for _ in 0..4 {
        step_once(&mut game, &mut now);
    }
    let walked = game.state_as::<AdventureState>().unwrap().layer_offsets();
    assert!(walked[0] > 0.0);

    // the fifth step starts the encounter with the queue still full
    game.display_mut()
        .push_event(HostEvent::KeyDown(Scancode::Space));
    game.display_mut()
        .push_event(HostEvent::KeyDown(Scancode::Space));
    now += 100;
    assert!(game.frame(now));
    game.display_mut()
        .push_event(HostEvent::KeyDown(Scancode::Space));
    assert_eq!(game.state_as::<AdventureState>().unwrap().queued_steps(), 1);
    while game.state().map(|s| s.name()) != Some("encounter") {
        now += 100;
        assert!(game.frame(now));
        assert!(now < 10_000, "encounter never started");
    }
    let suspended = suspended_adventure(&game).unwrap();
    let offsets = suspended.layer_offsets();
    assert!(offsets[0] > walked[0]);
    assert_eq!(suspended.queued_steps(), 1);
    assert_eq!(steps(&game), 5);

    while game.state_as::<EncounterState>().unwrap().phase() != EncounterPhase::Ready {
        now += 100;
        assert!(game.frame(now));
    }
    // time spent in the encounter does not move the suspended adventure
    assert_eq!(suspended_adventure(&game).unwrap().layer_offsets(), offsets);

    game.display_mut()
        .push_event(HostEvent::KeyDown(Scancode::Return));
    now += 100;
    assert!(game.frame(now));

    let adventure = game.state_as::<AdventureState>().unwrap();
    assert_eq!(adventure.layer_offsets(), offsets);
    assert_eq!(adventure.queued_steps(), 1);
    assert_eq!(adventure.steps_taken_this_chapter(), 5);
    assert_eq!(game.suspended_states().count(), 0);

    // the queued step is walked after the return
    step_once(&mut game, &mut now);
    assert!(steps(&game) >= 6);
}

#[test]
fn test_roster_enemies_get_sheets_and_animations() {
    let config = make_config("roster");
    let data = config.asset_root.join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("combatants.json"),
        r#"[{"name":"Andromon","sprite_id":"andromon","max_hp":220,
            "attack":{"frames":[5,6],"durations_ms":[150,150]}}]"#,
    )
    .unwrap();
    let mut game = Game::new(HeadlessDisplay::new(NATIVE_WIDTH, NATIVE_HEIGHT), config);
    game.init("Digivice", 466, 466).unwrap();

    assert!(game.world().resource::<TextureStore>().contains("andromon"));
    let animations = game.world().resource::<AnimationStore>();
    assert!(animations.get("andromon_idle").unwrap().loops);
    let attack = animations.get("andromon_attack").unwrap();
    assert!(!attack.loops);
    assert_eq!(attack.total_duration_ms(), 300);

    // the enemy plays its own attack instead of skipping to ready
    let enemy = game.world().resource::<CombatantRoster>().combatants[0].clone();
    game.world_mut()
        .resource_mut::<NextGameState>()
        .set(GameStates::Encounter(enemy));
    let mut now = 0;
    assert!(game.frame(now));
    let mut saw_attack = false;
    while game.state_as::<EncounterState>().unwrap().phase() != EncounterPhase::Ready {
        now += 100;
        assert!(game.frame(now));
        saw_attack |= game.state_as::<EncounterState>().unwrap().phase() == EncounterPhase::Attack;
    }
    assert!(saw_attack);
    assert!(game.world().resource::<TextureStore>().missing_ids().is_empty());
}

#[test]
fn test_chapter_complete_starts_next_chapter() {
    let mut game = Game::new(
        HeadlessDisplay::new(NATIVE_WIDTH, NATIVE_HEIGHT),
        make_config("chapter"),
    );
    game.world_mut().insert_resource(PlayerData {
        partner: Digimon::Gomamon,
        chapter: 1,
        steps_this_chapter: CHAPTER_STEP_GOAL - 1,
        total_steps: 1_000,
    });
    game.init("Digivice", 466, 466).unwrap();
    let mut now = 0;
    assert!(game.frame(now));
    step_once(&mut game, &mut now);

    let player = game.world().resource::<PlayerData>().clone();
    assert_eq!(player.chapter, 2);
    assert_eq!(player.steps_this_chapter, 0);
    assert_eq!(player.total_steps, 1_001);
    assert_eq!(player.partner, Digimon::Gomamon);

    let adventure = game.state_as::<AdventureState>().unwrap();
    assert_eq!(adventure.steps_taken_this_chapter(), 0);
    assert!(!adventure.is_chapter_complete());
    assert_eq!(adventure.current_digimon(), Digimon::Gomamon);
}

#[test]
fn test_letterboxed_window_image() {
    let mut game = Game::new(
        HeadlessDisplay::new(NATIVE_WIDTH, NATIVE_HEIGHT),
        make_config("letterbox"),
    );
    game.init("Digivice", 1000, 1000).unwrap();
    assert!(game.frame(0));

    // scale 2, centered with a 34 pixel margin
    let display = game.display();
    let target = display.target().unwrap();
    let window = display.window_pixels();
    for x in 0..34 {
        assert_eq!(window[500 * 1000 + x], 0);
    }
    for k in [0u32, 100, 233, 465] {
        let wx = 34 + 2 * k as usize;
        let wy = 34 + 2 * 233;
        assert_eq!(window[wy * 1000 + wx], target.pixel(k, 233).unwrap());
        assert_eq!(window[(wy + 1) * 1000 + wx + 1], target.pixel(k, 233).unwrap());
    }
}

#[test]
fn test_resize_updates_window_size() {
    let mut game = make_game("resize");
    game.display_mut().resize(800, 600);
    assert!(game.frame(0));
    assert_eq!(
        *game.world().resource::<WindowSize>(),
        WindowSize { w: 800, h: 600 }
    );
}

#[test]
fn test_rebind_persists_to_config_file() {
    let mut game = make_game("rebind");
    assert!(game.rebind_action(GameAction::Step, Scancode::B));
    {
        let map = game.world().resource::<InputMap>();
        assert_eq!(map.action_for(Scancode::B), Some(GameAction::Step));
        assert_eq!(map.action_for(Scancode::Space), None);
    }

    let path = game.world().resource::<GameConfig>().config_path.clone();
    let mut reloaded = GameConfig::with_path(&path);
    reloaded.load_from_file().unwrap();
    assert_eq!(
        &InputMap::from_store(&reloaded),
        game.world().resource::<InputMap>()
    );

    // the new key walks, the old one does nothing
    let mut now = 0;
    assert!(game.frame(now));
    game.display_mut()
        .push_event(HostEvent::KeyDown(Scancode::Space));
    now += 100;
    assert!(game.frame(now));
    assert_eq!(
        game.state_as::<AdventureState>().unwrap().player_state(),
        PlayerState::Idle
    );
    game.display_mut().push_event(HostEvent::KeyDown(Scancode::B));
    now += 100;
    assert!(game.frame(now));
    assert_eq!(
        game.state_as::<AdventureState>().unwrap().player_state(),
        PlayerState::Walking
    );
}

#[test]
fn test_shutdown_is_idempotent() {
    let mut game = make_game("shutdown");
    assert!(game.frame(0));
    game.shutdown();
    assert!(!game.is_running());
    assert!(!game.display().is_initialized());
    game.shutdown();
    assert!(!game.frame(100));
}
