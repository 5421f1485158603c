//! Player progress shared between states.

use bevy_ecs::prelude::Resource;

use crate::components::digimon::Digimon;
use crate::constants::CHAPTER_STEP_GOAL;

/// Partner choice and step counters, kept across state swaps.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct PlayerData {
    pub partner: Digimon,
    /// Current chapter, starting at 1.
    pub chapter: u32,
    pub steps_this_chapter: u32,
    pub total_steps: u64,
}

impl Default for PlayerData {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerData {
    pub fn new() -> Self {
        Self {
            partner: Digimon::default(),
            chapter: 1,
            steps_this_chapter: 0,
            total_steps: 0,
        }
    }

    pub fn chapter_complete(&self) -> bool {
        self.steps_this_chapter >= CHAPTER_STEP_GOAL
    }

    /// Move to the next chapter, resetting the chapter step counter.
    pub fn start_next_chapter(&mut self) {
        self.chapter += 1;
        self.steps_this_chapter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_chapter_resets_counter() {
        let mut data = PlayerData::new();
        data.steps_this_chapter = CHAPTER_STEP_GOAL;
        data.total_steps = 300;
        assert!(data.chapter_complete());
        data.start_next_chapter();
        assert_eq!(data.chapter, 2);
        assert_eq!(data.steps_this_chapter, 0);
        assert_eq!(data.total_steps, 300);
    }
}
