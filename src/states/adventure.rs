//! Adventure screen: the partner walks through a parallax world.
//!
//! Each `STEP` press queues one step (at most [`MAX_QUEUED_STEPS`]). An idle
//! partner with queued steps starts walking; every completed walk cycle is
//! one step. Steps feed the chapter goal and, every
//! [`STEPS_PER_ENCOUNTER_CHECK`] steps, an encounter roll.

use std::any::Any;

use arrayvec::ArrayVec;
use bevy_ecs::prelude::{Mut, World};
use log::{debug, info};

use crate::components::animation::AnimationCursor;
use crate::components::digimon::Digimon;
use crate::components::parallax::ParallaxLayer;
use crate::constants::*;
use crate::display::Display;
use crate::resources::animationstore::AnimationStore;
use crate::resources::backgrounds::{BackgroundSelection, LayerKind, layer_texture_id};
use crate::resources::encounter::{CombatantRoster, EncounterRng};
use crate::resources::gamestate::{GameStates, NextGameState};
use crate::resources::input::GameAction;
use crate::resources::playerdata::PlayerData;
use crate::resources::texturestore::TextureStore;
use crate::states::GameState;
use crate::systems::animation::{AnimationEvent, advance_cursor};
use crate::systems::render::{draw_parallax_layer, draw_sprite};

const DEFAULT_ENVIRONMENT: &str = "tropicaljungle";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Walking,
}

pub struct AdventureState {
    current_digimon: Digimon,
    player_state: PlayerState,
    active_key: String,
    cursor: AnimationCursor,
    queued_steps: u32,
    steps_taken_this_chapter: u32,
    steps_since_encounter_check: u32,
    /// Front (L0) to back (L2).
    layers: ArrayVec<ParallaxLayer, 3>,
    /// Adventure clock; stands still while paused.
    clock_ms: u64,
    paused: bool,
    chapter_complete: bool,
}

impl AdventureState {
    /// Build from the shared player data, idle at the start of a chapter run.
    pub fn new(world: &World) -> Self {
        let player = world.resource::<PlayerData>();
        let current_digimon = player.partner;
        let steps_taken_this_chapter = player.steps_this_chapter.min(CHAPTER_STEP_GOAL);

        let active_key = current_digimon.idle_key();
        let cursor = AnimationCursor::new(
            world.resource::<AnimationStore>().get_or_fallback(&active_key),
            0,
        );

        Self {
            current_digimon,
            player_state: PlayerState::Idle,
            active_key,
            cursor,
            queued_steps: 0,
            steps_taken_this_chapter,
            steps_since_encounter_check: 0,
            layers: build_layers(world),
            clock_ms: 0,
            paused: false,
            chapter_complete: false,
        }
    }

    pub fn current_digimon(&self) -> Digimon {
        self.current_digimon
    }

    pub fn player_state(&self) -> PlayerState {
        self.player_state
    }

    pub fn queued_steps(&self) -> u32 {
        self.queued_steps
    }

    pub fn steps_taken_this_chapter(&self) -> u32 {
        self.steps_taken_this_chapter
    }

    pub fn steps_since_encounter_check(&self) -> u32 {
        self.steps_since_encounter_check
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the chapter goal was reached and signalled.
    pub fn is_chapter_complete(&self) -> bool {
        self.chapter_complete
    }

    pub fn cursor(&self) -> &AnimationCursor {
        &self.cursor
    }

    /// Animation store key of the playing animation.
    pub fn active_animation_key(&self) -> &str {
        &self.active_key
    }

    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    pub fn layer_offsets(&self) -> [f32; 3] {
        let mut offsets = [0.0; 3];
        for (slot, layer) in offsets.iter_mut().zip(&self.layers) {
            *slot = layer.offset();
        }
        offsets
    }

    /// Pick the idle or walk animation of the current partner and restart it.
    fn set_active_animation(&mut self, world: &World) {
        self.active_key = match self.player_state {
            PlayerState::Idle => self.current_digimon.idle_key(),
            PlayerState::Walking => self.current_digimon.walk_key(),
        };
        let animation = world
            .resource::<AnimationStore>()
            .get_or_fallback(&self.active_key);
        self.cursor.play(animation, self.clock_ms);
    }

    fn set_player_state(&mut self, world: &World, state: PlayerState) {
        self.player_state = state;
        self.set_active_animation(world);
    }

    fn select_partner(&mut self, world: &mut World, digimon: Digimon) {
        info!("Partner {:?} -> {:?}", self.current_digimon, digimon);
        self.current_digimon = digimon;
        self.queued_steps = 0;
        self.set_player_state(world, PlayerState::Idle);
        world.resource_mut::<PlayerData>().partner = digimon;
    }

    fn store_player_data(&self, world: &mut World) {
        let mut player = world.resource_mut::<PlayerData>();
        player.partner = self.current_digimon;
        player.steps_this_chapter = self.steps_taken_this_chapter;
    }

    fn enqueue_step(&mut self) {
        if self.paused || self.chapter_complete {
            debug!("Step ignored");
            return;
        }
        if self.queued_steps < MAX_QUEUED_STEPS {
            self.queued_steps += 1;
        } else {
            debug!("Step queue full, dropping step");
        }
    }

    /// Book one finished walk cycle and run the chapter and encounter checks.
    fn complete_step(&mut self, world: &mut World) {
        self.steps_taken_this_chapter += 1;
        self.steps_since_encounter_check += 1;
        {
            let mut player = world.resource_mut::<PlayerData>();
            player.steps_this_chapter = self.steps_taken_this_chapter;
            player.total_steps += 1;
        }

        let check_due = self.steps_since_encounter_check >= STEPS_PER_ENCOUNTER_CHECK;
        if check_due {
            self.steps_since_encounter_check = 0;
        }

        if self.steps_taken_this_chapter >= CHAPTER_STEP_GOAL {
            self.chapter_complete = true;
            self.queued_steps = 0;
            info!(
                "Chapter goal of {} steps reached",
                self.steps_taken_this_chapter
            );
            world
                .resource_mut::<NextGameState>()
                .set(GameStates::ChapterComplete);
        } else if check_due {
            self.roll_encounter(world);
        }
    }

    fn roll_encounter(&mut self, world: &mut World) {
        if !world.resource_mut::<EncounterRng>().roll() {
            debug!("No encounter at step {}", self.steps_taken_this_chapter);
            return;
        }
        let enemy = world.resource_scope(|world, mut rng: Mut<EncounterRng>| {
            world.resource::<CombatantRoster>().pick(&mut rng)
        });
        let enemy = enemy.unwrap_or_default();
        info!(
            "Encounter with {} at step {}",
            enemy.name, self.steps_taken_this_chapter
        );
        world
            .resource_mut::<NextGameState>()
            .set(GameStates::Encounter(enemy));
    }
}

impl GameState for AdventureState {
    fn name(&self) -> &'static str {
        "adventure"
    }

    fn enter(&mut self, world: &mut World) {
        let player = world.resource::<PlayerData>().clone();
        self.current_digimon = player.partner;
        self.steps_taken_this_chapter = player.steps_this_chapter.min(CHAPTER_STEP_GOAL);
        self.set_player_state(world, PlayerState::Idle);
        info!(
            "Adventure: chapter {}, {} / {} steps with {:?}",
            player.chapter, self.steps_taken_this_chapter, CHAPTER_STEP_GOAL, self.current_digimon
        );
    }

    fn exit(&mut self, world: &mut World) {
        self.store_player_data(world);
    }

    fn suspend(&mut self, world: &mut World) {
        self.store_player_data(world);
        debug!(
            "Adventure suspended with {} queued steps, offsets {:?}",
            self.queued_steps,
            self.layer_offsets()
        );
    }

    fn resume(&mut self, _world: &mut World) {
        info!(
            "Adventure resumed at {} / {} steps",
            self.steps_taken_this_chapter, CHAPTER_STEP_GOAL
        );
    }

    fn handle_input(&mut self, world: &mut World, action: GameAction) {
        match action {
            GameAction::Step => self.enqueue_step(),
            GameAction::CycleDigimon => {
                let next = self.current_digimon.next();
                self.select_partner(world, next);
            }
            GameAction::PauseToggle => {
                self.paused = !self.paused;
                info!("Adventure {}", if self.paused { "paused" } else { "resumed" });
            }
            GameAction::QuitGame => {
                world.resource_mut::<NextGameState>().set(GameStates::Quitting);
            }
            other => {
                if let Some(digimon) = other.partner_slot().and_then(Digimon::from_index) {
                    self.select_partner(world, digimon);
                }
            }
        }
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        if self.paused {
            return;
        }
        let delta_ms = (dt.max(0.0) * 1000.0).round() as u64;
        self.clock_ms += delta_ms;

        let was_walking = self.player_state == PlayerState::Walking;
        if self.player_state == PlayerState::Idle
            && self.queued_steps > 0
            && !self.chapter_complete
        {
            self.queued_steps -= 1;
            self.set_player_state(world, PlayerState::Walking);
        }

        let event = advance_cursor(&mut self.cursor, self.clock_ms);

        if was_walking {
            for layer in &mut self.layers {
                layer.scroll(delta_ms);
            }
        }

        if self.player_state != PlayerState::Walking {
            return;
        }
        if let Some(AnimationEvent::CycleComplete { cycles }) = event {
            for _ in 0..cycles {
                self.complete_step(world);
                if self.queued_steps > 0 && !self.chapter_complete {
                    // keep walking; the cursor has already wrapped into the next cycle
                    self.queued_steps -= 1;
                } else {
                    self.set_player_state(world, PlayerState::Idle);
                    break;
                }
            }
        }
    }

    fn render(&self, world: &World, display: &mut dyn Display) {
        let textures = world.resource::<TextureStore>();
        for layer in self.layers.iter().rev() {
            draw_parallax_layer(display, textures, layer);
        }

        let frame = self.cursor.current_frame();
        let (w, h) = display.native_size();
        let x = w as i32 / 2 - frame.rect.w as i32 / 2;
        let y = h as i32 / 2 - frame.rect.h as i32 / 2 + PLAYER_Y_OFFSET;
        draw_sprite(display, textures, frame, x, y);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn build_layers(world: &World) -> ArrayVec<ParallaxLayer, 3> {
    let textures = world.resource::<TextureStore>();
    let selection = world.get_resource::<BackgroundSelection>();
    LayerKind::ALL
        .iter()
        .map(|layer| {
            let id = match selection {
                Some(selection) => selection.texture_id(*layer),
                None => layer_texture_id(DEFAULT_ENVIRONMENT, *layer),
            };
            let width = textures
                .get(&id)
                .map(|atlas| atlas.width())
                .unwrap_or(BACKGROUND_WIDTH);
            ParallaxLayer::new(id, width as f32, LAYER_SPEEDS[layer.index()])
        })
        .collect()
}
