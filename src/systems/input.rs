//! Host event translation.
//!
//! Turns raw [`HostEvent`]s into what the loop acts on, using the current
//! [`InputMap`].

use crate::events::input::HostEvent;
use crate::resources::input::{GameAction, InputMap};

/// One thing the loop must react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameInput {
    Quit,
    Resized { width: u32, height: u32 },
    Action(GameAction),
}

/// Translate one host event. Unbound keys yield `None`.
pub fn translate_event(map: &InputMap, event: HostEvent) -> Option<FrameInput> {
    match event {
        HostEvent::Quit => Some(FrameInput::Quit),
        HostEvent::Resized { width, height } => Some(FrameInput::Resized { width, height }),
        HostEvent::KeyDown(key) => match map.action_for(key)? {
            GameAction::QuitGame => Some(FrameInput::Quit),
            action => Some(FrameInput::Action(action)),
        },
    }
}
