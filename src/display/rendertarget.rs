//! Software render target at the game's native resolution.
//!
//! Owned by a display driver. All game drawing lands here; the driver then
//! scales it into the host window with [`RenderTarget::present_into`] or by
//! uploading [`RenderTarget::to_rgba`] to a GPU texture.

use crate::components::sprite::SourceRect;
use crate::constants::TRANSPARENT_KEY;
use crate::display::{PixelSource, rgb565_to_rgb888};
use crate::resources::windowsize::Letterbox;

/// Fixed-size RGB565 framebuffer.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    /// Game's internal render width in pixels.
    pub game_width: u32,
    /// Game's internal render height in pixels.
    pub game_height: u32,
    pixels: Vec<u16>,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            game_width: width,
            game_height: height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.game_width || y >= self.game_height {
            return None;
        }
        Some(self.pixels[(y * self.game_width + x) as usize])
    }

    pub fn clear(&mut self, color: u16) {
        self.pixels.fill(color);
    }

    /// Copy `rect` of `src` to `(dst_x, dst_y)`, clipping against both the
    /// source buffer and the target and skipping transparent pixels.
    pub fn blit(&mut self, dst_x: i32, dst_y: i32, src: PixelSource<'_>, rect: SourceRect) {
        if src.data.len() < src.width as usize * src.height as usize {
            return;
        }
        // Clip the source rectangle to the source buffer, shifting the
        // destination by the amount trimmed on the left/top.
        let mut sx0 = rect.x as i64;
        let mut sy0 = rect.y as i64;
        let mut sx1 = rect.x as i64 + rect.w as i64;
        let mut sy1 = rect.y as i64 + rect.h as i64;
        let mut dx = dst_x as i64;
        let mut dy = dst_y as i64;
        if sx0 < 0 {
            dx -= sx0;
            sx0 = 0;
        }
        if sy0 < 0 {
            dy -= sy0;
            sy0 = 0;
        }
        sx1 = sx1.min(src.width as i64);
        sy1 = sy1.min(src.height as i64);

        // Then clip to the target.
        if dx < 0 {
            sx0 -= dx;
            dx = 0;
        }
        if dy < 0 {
            sy0 -= dy;
            dy = 0;
        }
        sx1 = sx1.min(sx0 + self.game_width as i64 - dx);
        sy1 = sy1.min(sy0 + self.game_height as i64 - dy);
        if sx0 >= sx1 || sy0 >= sy1 {
            return;
        }

        let w = (sx1 - sx0) as usize;
        for row in 0..(sy1 - sy0) as usize {
            let src_start = (sy0 as usize + row) * src.width as usize + sx0 as usize;
            let dst_start = (dy as usize + row) * self.game_width as usize + dx as usize;
            let src_row = &src.data[src_start..src_start + w];
            let dst_row = &mut self.pixels[dst_start..dst_start + w];
            for (d, s) in dst_row.iter_mut().zip(src_row) {
                if *s != TRANSPARENT_KEY {
                    *d = *s;
                }
            }
        }
    }

    /// Nearest-neighbour scale into a `window_w x window_h` RGB565 buffer
    /// using `letterbox`; everything outside the box is black.
    pub fn present_into(&self, window: &mut [u16], window_w: u32, window_h: u32, letterbox: &Letterbox) {
        window.fill(0);
        let scale = letterbox.scale.max(1) as i64;
        for wy in 0..window_h as i64 {
            let gy = (wy - letterbox.y as i64).div_euclid(scale);
            if gy < 0 || gy >= self.game_height as i64 || wy < letterbox.y as i64 {
                continue;
            }
            let row = (wy * window_w as i64) as usize;
            for wx in 0..window_w as i64 {
                if wx < letterbox.x as i64 {
                    continue;
                }
                let gx = (wx - letterbox.x as i64) / scale;
                if gx >= self.game_width as i64 {
                    break;
                }
                window[row + wx as usize] =
                    self.pixels[gy as usize * self.game_width as usize + gx as usize];
            }
        }
    }

    /// Expand to tightly packed RGBA8 for GPU upload, reusing `out`.
    pub fn to_rgba(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.pixels.len() * 4);
        for px in &self.pixels {
            let (r, g, b) = rgb565_to_rgb888(*px);
            out.extend_from_slice(&[r, g, b, 255]);
        }
    }
}
