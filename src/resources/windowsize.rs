//! Window size resource.
//!
//! Tracks the actual window dimensions in pixels, which may differ from the
//! game's render resolution. Updated each frame to handle window resizing.

use bevy_ecs::prelude::Resource;

/// Destination of the scaled off-screen target inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Letterbox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Integer magnification, never below 1.
    pub scale: u32,
}

/// Current window size in pixels.
///
/// This represents the actual OS window dimensions, not the game's internal
/// render resolution.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl WindowSize {
    /// Calculate the destination rectangle for integer-ratio letterboxing.
    ///
    /// The scale is the largest whole factor that fits both axes, at least 1.
    /// The box is centered; when the window is smaller than the game the
    /// offsets go negative and the edges are cropped evenly.
    pub fn calculate_letterbox(&self, game_width: u32, game_height: u32) -> Letterbox {
        let scale_x = self.w / game_width.max(1);
        let scale_y = self.h / game_height.max(1);
        let scale = scale_x.min(scale_y).max(1);
        let width = game_width * scale;
        let height = game_height * scale;
        Letterbox {
            x: (self.w as i32 - width as i32) / 2,
            y: (self.h as i32 - height as i32) / 2,
            width,
            height,
            scale,
        }
    }
}
