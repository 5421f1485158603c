//! Playback position inside an [`Animation`].

use std::sync::Arc;

use crate::components::sprite::SpriteFrame;
use crate::resources::animationstore::Animation;

/// Runtime cursor over a shared animation definition.
///
/// Advanced with [`advance_cursor`](crate::systems::animation::advance_cursor).
#[derive(Debug, Clone)]
pub struct AnimationCursor {
    animation: Arc<Animation>,
    /// Index of the frame being shown, always in `0..len`.
    pub current_index: usize,
    /// Clock time at which the current frame's display started.
    pub last_tick_ms: u64,
    /// Set once a non-looping animation reached its last frame.
    pub finished: bool,
}

impl AnimationCursor {
    pub fn new(animation: Arc<Animation>, now_ms: u64) -> Self {
        Self {
            animation,
            current_index: 0,
            last_tick_ms: now_ms,
            finished: false,
        }
    }

    /// Switch to `animation` and restart from frame 0.
    pub fn play(&mut self, animation: Arc<Animation>, now_ms: u64) {
        self.animation = animation;
        self.reset(now_ms);
    }

    /// Restart the current animation from frame 0.
    pub fn reset(&mut self, now_ms: u64) {
        self.current_index = 0;
        self.last_tick_ms = now_ms;
        self.finished = false;
    }

    pub fn animation(&self) -> &Arc<Animation> {
        &self.animation
    }

    pub fn current_frame(&self) -> &SpriteFrame {
        self.animation.frame(self.current_index)
    }
}
