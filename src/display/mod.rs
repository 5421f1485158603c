//! Platform-agnostic display capability.
//!
//! Game code draws RGB565 pixels into a fixed native-resolution
//! [`RenderTarget`] through the [`Display`] trait. Drivers own that target and,
//! on [`Display::present`], scale it into their host window with integer
//! letterboxing (see [`WindowSize::calculate_letterbox`]).
//!
//! Drivers:
//! - [`headless::HeadlessDisplay`] keeps the window in memory (tests, CI).
//! - `raylib::RaylibDisplay` opens a desktop window (cargo feature `raylib`).
//!
//! [`WindowSize::calculate_letterbox`]: crate::resources::windowsize::WindowSize::calculate_letterbox

pub mod headless;
#[cfg(feature = "raylib")]
pub mod raylib;
pub mod rendertarget;

use crate::components::sprite::SourceRect;
use crate::events::input::HostEvent;

pub use rendertarget::RenderTarget;

/// Borrowed RGB565 pixel buffer, row-major.
#[derive(Debug, Clone, Copy)]
pub struct PixelSource<'a> {
    pub data: &'a [u16],
    pub width: u32,
    pub height: u32,
}

/// Raster sink every driver implements.
pub trait Display {
    /// Open the host window at `width x height` and allocate the off-screen
    /// target.
    fn init(&mut self, title: &str, width: u32, height: u32) -> Result<(), String>;

    fn is_initialized(&self) -> bool;

    /// Fixed resolution of the off-screen target.
    fn native_size(&self) -> (u32, u32);

    /// Fill the off-screen target with `color`.
    fn clear(&mut self, color: u16);

    /// Copy `rect` of `src` to `(dst_x, dst_y)` on the off-screen target.
    ///
    /// Parts of `rect` outside `src` or the target are clipped. Pixels equal to
    /// [`TRANSPARENT_KEY`](crate::constants::TRANSPARENT_KEY) are skipped.
    /// Does nothing before [`Display::init`].
    fn draw_pixels(&mut self, dst_x: i32, dst_y: i32, src: PixelSource<'_>, rect: SourceRect);

    /// Blit the off-screen target to the window and show it.
    fn present(&mut self) -> Result<(), String>;

    /// Release the window. Safe to call more than once.
    fn close(&mut self);

    /// Current host window size in pixels.
    fn window_size(&self) -> (u32, u32);

    /// Drain pending host events.
    fn poll_events(&mut self) -> Vec<HostEvent>;

    fn begin_frame(&mut self, background: u16) {
        self.clear(background);
    }

    fn end_frame(&mut self) -> Result<(), String> {
        self.present()
    }
}

/// Expand RGB565 to 8-bit channels.
pub fn rgb565_to_rgb888(color: u16) -> (u8, u8, u8) {
    let r = ((color >> 11) & 0x1F) as u32;
    let g = ((color >> 5) & 0x3F) as u32;
    let b = (color & 0x1F) as u32;
    (
        (r * 255 / 31) as u8,
        (g * 255 / 63) as u8,
        (b * 255 / 31) as u8,
    )
}

/// Pack 8-bit channels into RGB565.
pub fn rgb888_to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_extremes() {
        assert_eq!(rgb565_to_rgb888(0xFFFF), (255, 255, 255));
        assert_eq!(rgb565_to_rgb888(0x0000), (0, 0, 0));
        assert_eq!(rgb565_to_rgb888(0xF800), (255, 0, 0));
        assert_eq!(rgb565_to_rgb888(0x07E0), (0, 255, 0));
    }

    #[test]
    fn test_rgb888_to_rgb565() {
        assert_eq!(rgb888_to_rgb565(255, 0, 255), 0xF81F);
        assert_eq!(rgb888_to_rgb565(255, 255, 255), 0xFFFF);
        let (r, g, b) = rgb565_to_rgb888(0x1234);
        assert_eq!(rgb888_to_rgb565(r, g, b), 0x1234);
    }
}
