//! Per-frame logic shared by the game states.
//!
//! Submodules overview
//! - [`animation`] – advance animation cursors against a millisecond clock
//! - [`input`] – translate host events into game actions
//! - [`render`] – draw sprites, parallax layers and rectangles through the display
//! - [`time`] – update simulation time and delta
pub mod animation;
pub mod input;
pub mod render;
pub mod time;
