//! Game states and the factory that builds them from transition requests.
//!
//! The [`Game`](crate::game::Game) owns exactly one boxed [`GameState`] and
//! drives it once per frame: input first, then update, then render. A state
//! asks for a transition through
//! [`NextGameState`](crate::resources::gamestate::NextGameState); the swap
//! happens after the frame is presented, calling `exit` on the old state
//! before `enter` on the new one. An encounter instead suspends the
//! adventure beneath it, which is resumed when the encounter ends.

pub mod adventure;
pub mod encounter;

use std::any::Any;

use bevy_ecs::prelude::World;
use log::info;

use crate::display::Display;
use crate::resources::gamestate::GameStates;
use crate::resources::input::GameAction;
use crate::resources::playerdata::PlayerData;

use adventure::AdventureState;
use encounter::EncounterState;

/// One screen of the game.
pub trait GameState {
    fn name(&self) -> &'static str;

    /// Called once when the state becomes active.
    fn enter(&mut self, _world: &mut World) {}

    /// Called once when the state is replaced or the game shuts down.
    fn exit(&mut self, _world: &mut World) {}

    /// Called when another state is pushed on top. The state is kept as is
    /// and receives no input, updates or renders until resumed.
    fn suspend(&mut self, _world: &mut World) {}

    /// Called when the state on top is popped and this one is active again.
    fn resume(&mut self, _world: &mut World) {}

    fn handle_input(&mut self, world: &mut World, action: GameAction);

    /// Advance by `dt` seconds.
    fn update(&mut self, world: &mut World, dt: f32);

    /// Draw into the display's off-screen target.
    fn render(&self, world: &World, display: &mut dyn Display);

    fn as_any(&self) -> &dyn Any;
}

/// Build the state a request asks for. `Quitting` has no state.
pub fn build_state(request: GameStates, world: &mut World) -> Option<Box<dyn GameState>> {
    match request {
        GameStates::Adventure => Some(Box::new(AdventureState::new(world))),
        GameStates::Encounter(enemy) => Some(Box::new(EncounterState::new(world, enemy))),
        GameStates::ChapterComplete => {
            let chapter = {
                let mut player = world.resource_mut::<PlayerData>();
                player.start_next_chapter();
                player.chapter
            };
            info!("Chapter complete, starting chapter {}", chapter);
            Some(Box::new(AdventureState::new(world)))
        }
        GameStates::Quitting => None,
    }
}
