//! Tuning constants shared by the adventure runtime.
//!
//! Values here are the authoritative defaults; anything a player may want to
//! change at runtime (window size, encounter probability) also has an entry in
//! [`GameConfig`](crate::resources::gameconfig::GameConfig).

/// Native render resolution of the handheld screen.
pub const NATIVE_WIDTH: u32 = 466;
pub const NATIVE_HEIGHT: u32 = 466;

/// Window title passed to the display driver.
pub const WINDOW_TITLE: &str = "Digivice";

/// Steps that complete a chapter.
pub const CHAPTER_STEP_GOAL: u32 = 300;
/// An encounter roll happens every this many completed steps.
pub const STEPS_PER_ENCOUNTER_CHECK: u32 = 5;
/// Default chance that an encounter roll starts a battle.
pub const DEFAULT_ENCOUNTER_PROBABILITY: f32 = 0.15;
/// Steps that can be buffered while the partner is still walking.
pub const MAX_QUEUED_STEPS: u32 = 2;

/// Parallax speeds in pixels per step, front (L0) to back (L2).
pub const LAYER_SPEEDS: [f32; 3] = [3.0, 1.0, 0.5];
/// Converts a layer speed into pixels per second of walking.
pub const SCROLL_PIXELS_PER_SECOND: f32 = 10.0;

/// Background strip size of the converted environment art.
pub const BACKGROUND_WIDTH: u32 = 1421;
pub const BACKGROUND_HEIGHT: u32 = 474;

/// Vertical nudge applied to the partner sprite so its feet meet the ground line.
pub const PLAYER_Y_OFFSET: i32 = -7;

/// Texture id that always resolves to the placeholder sheet.
pub const FALLBACK_SPRITE_ID: &str = "fallback_sprite";

/// Digimon sheets are single-row strips of this many cells.
pub const SPRITE_SHEET_COLUMNS: u32 = 10;

/// RGB565 magenta; pixels with this value are not drawn.
pub const TRANSPARENT_KEY: u16 = 0xF81F;
/// Colour the off-screen target is cleared to each frame.
pub const BACKGROUND_COLOR: u16 = 0x0000;

/// Longest frame delta the loop will hand to a state, in seconds.
pub const MAX_FRAME_DELTA: f32 = 0.1;
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// How long the encounter screen shows the enemy before it attacks.
pub const ENCOUNTER_REVEAL_MS: u64 = 2000;

/// Animation tables: frame indices into a sprite sheet and per-frame durations.
pub const IDLE_INDICES: [usize; 2] = [1, 2];
pub const IDLE_DURATIONS_MS: [u32; 2] = [800, 800];
pub const WALK_INDICES: [usize; 4] = [3, 4, 3, 4];
pub const WALK_DURATIONS_MS: [u32; 4] = [300, 300, 300, 300];
pub const KUWAGAMON_IDLE_INDICES: [usize; 2] = [1, 2];
pub const KUWAGAMON_IDLE_DURATIONS_MS: [u32; 2] = [800, 800];
pub const KUWAGAMON_ATTACK_INDICES: [usize; 3] = [3, 4, 3];
pub const KUWAGAMON_ATTACK_DURATIONS_MS: [u32; 3] = [200, 300, 250];
