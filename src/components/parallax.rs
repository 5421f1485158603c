//! Horizontally repeating background layer.

use std::sync::Arc;

use crate::constants::SCROLL_PIXELS_PER_SECOND;

/// One parallax strip with its own scroll speed.
///
/// The offset is kept in `[0, width)` at all times.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxLayer {
    /// Texture id of the strip.
    pub texture: Arc<str>,
    /// Repeat width in pixels.
    pub width: f32,
    /// Scroll speed in pixels per step.
    pub speed: f32,
    offset: f32,
}

impl ParallaxLayer {
    pub fn new(texture: impl Into<Arc<str>>, width: f32, speed: f32) -> Self {
        Self {
            texture: texture.into(),
            width,
            speed,
            offset: 0.0,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Move the layer by `pixels`, wrapping around its width.
    pub fn advance(&mut self, pixels: f32) -> f32 {
        if self.width <= 0.0 || !pixels.is_finite() {
            return self.offset;
        }
        self.offset = (self.offset + pixels).rem_euclid(self.width);
        // rem_euclid may round up to exactly `width` for tiny negatives
        if self.offset >= self.width || self.offset < 0.0 {
            self.offset = 0.0;
        }
        self.offset
    }

    /// Scroll for `delta_ms` milliseconds of walking.
    pub fn scroll(&mut self, delta_ms: u64) -> f32 {
        let pixels = self.speed * delta_ms as f32 * SCROLL_PIXELS_PER_SECOND / 1000.0;
        self.advance(pixels)
    }

    /// Screen x positions at which the strip must be drawn to cover
    /// `view_width` pixels without a seam.
    pub fn draw_positions(&self, view_width: u32) -> impl Iterator<Item = i32> {
        let start = -(self.offset.floor() as i32);
        let step = (self.width as i32).max(1);
        let view = view_width as i32;
        (0..)
            .map(move |i| start + i * step)
            .take_while(move |x| *x < view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_to_zero_on_full_width() {
        let mut layer = ParallaxLayer::new("bg", 1421.0, 3.0);
        for _ in 0..7 {
            layer.advance(203.0);
        }
        assert_eq!(layer.offset(), 0.0);
    }

    #[test]
    fn test_advance_never_negative() {
        let mut layer = ParallaxLayer::new("bg", 100.0, 1.0);
        layer.advance(-30.0);
        assert!((layer.offset() - 70.0).abs() < 1e-4);
        layer.advance(-1e-9);
        assert!(layer.offset() >= 0.0 && layer.offset() < 100.0);
    }

    #[test]
    fn test_scroll_uses_speed() {
        let mut layer = ParallaxLayer::new("bg", 1421.0, 3.0);
        layer.scroll(1000);
        assert!((layer.offset() - 3.0 * SCROLL_PIXELS_PER_SECOND).abs() < 1e-4);
    }

    #[test]
    fn test_draw_positions_cover_view() {
        let mut layer = ParallaxLayer::new("bg", 300.0, 1.0);
        layer.advance(250.0);
        let xs: Vec<i32> = layer.draw_positions(466).collect();
        assert_eq!(xs, vec![-250, 50, 350]);

        let wide = ParallaxLayer::new("bg", 1421.0, 1.0);
        assert_eq!(wide.draw_positions(466).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_zero_width_is_inert() {
        let mut layer = ParallaxLayer::new("bg", 0.0, 1.0);
        assert_eq!(layer.advance(10.0), 0.0);
    }
}
