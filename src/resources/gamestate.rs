//! Pending state transition resource.
//!
//! States never swap themselves. They write a request here and the
//! [`Game`](crate::game::Game) applies it after the frame has been presented.

use bevy_ecs::prelude::Resource;

use crate::components::combatant::Combatant;

/// Targets a state can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStates {
    Adventure,
    /// Battle against the given combatant.
    Encounter(Combatant),
    /// The chapter step goal was reached.
    ChapterComplete,
    Quitting,
}

/// Representation of a requested next state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NextGameStates {
    #[default]
    Unchanged,
    Pending(GameStates),
}

/// Intent to change to a new game state.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Default)]
pub struct NextGameState {
    next: NextGameStates,
}

impl NextGameState {
    /// Create a new value initialized to [`NextGameStates::Unchanged`].
    pub fn new() -> Self {
        NextGameState {
            next: NextGameStates::Unchanged,
        }
    }

    /// Get the current transition request.
    pub fn get(&self) -> &NextGameStates {
        &self.next
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.next, NextGameStates::Pending(_))
    }

    /// Request a transition to `next`. A later request in the same frame
    /// replaces an earlier one.
    pub fn set(&mut self, next: GameStates) {
        self.next = NextGameStates::Pending(next);
    }

    /// Take the pending request, leaving [`NextGameStates::Unchanged`].
    pub fn take(&mut self) -> Option<GameStates> {
        match std::mem::take(&mut self.next) {
            NextGameStates::Pending(state) => Some(state),
            NextGameStates::Unchanged => None,
        }
    }

    /// Reset to [`NextGameStates::Unchanged`].
    pub fn reset(&mut self) {
        self.next = NextGameStates::Unchanged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_clears_request() {
        let mut next = NextGameState::new();
        assert_eq!(next.take(), None);
        next.set(GameStates::ChapterComplete);
        assert!(next.is_pending());
        assert_eq!(next.take(), Some(GameStates::ChapterComplete));
        assert_eq!(next.get(), &NextGameStates::Unchanged);
    }
}
