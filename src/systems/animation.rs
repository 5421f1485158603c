//! Animation advance rule.
//!
//! Cursors are advanced against a millisecond clock owned by whoever plays
//! the animation. Calling [`advance_cursor`] twice with the same `now_ms` is a
//! no-op the second time.

use crate::components::animation::AnimationCursor;

/// What happened to a cursor during one advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// A looping animation wrapped back to frame 0 `cycles` times.
    CycleComplete { cycles: u32 },
    /// A non-looping animation reached its last frame.
    Finished,
}

/// Advance `cursor` to clock time `now_ms`.
///
/// Frames whose full duration has elapsed are skipped. A looping animation
/// reports every wrap in a single [`AnimationEvent::CycleComplete`]; a
/// non-looping one clamps on its last frame and reports
/// [`AnimationEvent::Finished`] exactly once.
pub fn advance_cursor(cursor: &mut AnimationCursor, now_ms: u64) -> Option<AnimationEvent> {
    if cursor.finished {
        cursor.last_tick_ms = now_ms;
        return None;
    }

    let animation = cursor.animation().clone();
    let len = animation.len();
    let mut elapsed = now_ms.saturating_sub(cursor.last_tick_ms);
    let mut cycles = 0u32;

    while elapsed >= animation.duration_ms(cursor.current_index) as u64 {
        elapsed -= animation.duration_ms(cursor.current_index) as u64;
        cursor.current_index += 1;
        if cursor.current_index == len {
            if animation.loops {
                cursor.current_index = 0;
                cycles += 1;
            } else {
                cursor.current_index = len - 1;
                cursor.finished = true;
                cursor.last_tick_ms = now_ms;
                return Some(AnimationEvent::Finished);
            }
        }
    }

    cursor.last_tick_ms = now_ms.saturating_sub(elapsed);
    (cycles > 0).then_some(AnimationEvent::CycleComplete { cycles })
}
