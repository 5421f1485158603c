//! Encounter intro screen.
//!
//! Shows the enemy that interrupted the walk: it idles for a moment, plays
//! its attack once, and then waits for `CONFIRM` or `CANCEL` to return to the
//! adventure. Battle resolution is not part of this screen.

use std::any::Any;

use bevy_ecs::prelude::World;
use log::info;

use crate::components::animation::AnimationCursor;
use crate::components::combatant::Combatant;
use crate::constants::ENCOUNTER_REVEAL_MS;
use crate::display::Display;
use crate::resources::animationstore::AnimationStore;
use crate::resources::gamestate::{GameStates, NextGameState};
use crate::resources::input::GameAction;
use crate::resources::texturestore::TextureStore;
use crate::states::GameState;
use crate::systems::animation::{AnimationEvent, advance_cursor};
use crate::systems::render::{draw_sprite, fill_rect};

const BACKDROP_COLOR: u16 = 0x18E3;
const HP_BAR_WIDTH: u32 = 200;
const HP_BAR_HEIGHT: u32 = 8;
const HP_BAR_MARGIN: i32 = 40;
const HP_BAR_BACK: u16 = 0x4208;
const HP_BAR_FILL: u16 = 0x07E0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterPhase {
    /// Enemy idles before acting.
    Reveal,
    /// Attack animation is playing.
    Attack,
    /// Waiting for the player to continue.
    Ready,
}

pub struct EncounterState {
    enemy: Combatant,
    phase: EncounterPhase,
    cursor: AnimationCursor,
    clock_ms: u64,
}

impl EncounterState {
    pub fn new(world: &World, enemy: Combatant) -> Self {
        let idle = world
            .resource::<AnimationStore>()
            .get_or_fallback(&enemy.idle_key());
        Self {
            enemy,
            phase: EncounterPhase::Reveal,
            cursor: AnimationCursor::new(idle, 0),
            clock_ms: 0,
        }
    }

    pub fn enemy(&self) -> &Combatant {
        &self.enemy
    }

    pub fn phase(&self) -> EncounterPhase {
        self.phase
    }

    fn play_idle(&mut self, world: &World) {
        let idle = world
            .resource::<AnimationStore>()
            .get_or_fallback(&self.enemy.idle_key());
        self.cursor.play(idle, self.clock_ms);
    }
}

impl GameState for EncounterState {
    fn name(&self) -> &'static str {
        "encounter"
    }

    fn enter(&mut self, _world: &mut World) {
        info!(
            "A wild {} appears! HP {}/{}, ATK {}, DEF {}",
            self.enemy.name,
            self.enemy.current_hp,
            self.enemy.max_hp,
            self.enemy.attack_power,
            self.enemy.defense_power
        );
    }

    fn handle_input(&mut self, world: &mut World, action: GameAction) {
        if self.phase != EncounterPhase::Ready {
            return;
        }
        if matches!(action, GameAction::Confirm | GameAction::Cancel) {
            world
                .resource_mut::<NextGameState>()
                .set(GameStates::Adventure);
        }
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        self.clock_ms += (dt.max(0.0) * 1000.0).round() as u64;
        let event = advance_cursor(&mut self.cursor, self.clock_ms);

        match self.phase {
            EncounterPhase::Reveal if self.clock_ms >= ENCOUNTER_REVEAL_MS => {
                let attack = world
                    .resource::<AnimationStore>()
                    .get(&self.enemy.attack_key());
                match attack {
                    Some(attack) => {
                        self.cursor.play(attack, self.clock_ms);
                        self.phase = EncounterPhase::Attack;
                    }
                    None => self.phase = EncounterPhase::Ready,
                }
            }
            EncounterPhase::Attack if event == Some(AnimationEvent::Finished) => {
                self.play_idle(world);
                self.phase = EncounterPhase::Ready;
            }
            _ => {}
        }
    }

    fn render(&self, world: &World, display: &mut dyn Display) {
        let textures = world.resource::<TextureStore>();
        let (w, h) = display.native_size();
        fill_rect(display, 0, 0, w, h, BACKDROP_COLOR);

        let frame = self.cursor.current_frame();
        let x = w as i32 / 2 - frame.rect.w as i32 / 2;
        let y = h as i32 / 2 - frame.rect.h as i32 / 2;
        draw_sprite(display, textures, frame, x, y);

        let bar_x = w as i32 / 2 - HP_BAR_WIDTH as i32 / 2;
        let bar_y = h as i32 - HP_BAR_MARGIN;
        fill_rect(display, bar_x, bar_y, HP_BAR_WIDTH, HP_BAR_HEIGHT, HP_BAR_BACK);
        let filled = (HP_BAR_WIDTH as f32 * self.enemy.hp_fraction()).round() as u32;
        fill_rect(display, bar_x, bar_y, filled, HP_BAR_HEIGHT, HP_BAR_FILL);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
