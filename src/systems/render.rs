//! Drawing helpers on top of the [`Display`] capability.
//!
//! States call these from their `render` step; everything lands on the
//! display's off-screen target.

use crate::components::parallax::ParallaxLayer;
use crate::components::sprite::{SourceRect, SpriteFrame};
use crate::display::{Display, PixelSource};
use crate::resources::texturestore::TextureStore;

/// Blit one sprite frame with its top-left corner at `(x, y)`.
///
/// An unknown atlas draws the fallback sheet's cell at the same rectangle.
pub fn draw_sprite(
    display: &mut dyn Display,
    textures: &TextureStore,
    frame: &SpriteFrame,
    x: i32,
    y: i32,
) {
    let atlas = textures.get_or_fallback(&frame.atlas);
    display.draw_pixels(x, y, atlas.source(), frame.rect);
}

/// Draw a parallax strip as many times as needed to cover the screen width,
/// vertically centered.
pub fn draw_parallax_layer(
    display: &mut dyn Display,
    textures: &TextureStore,
    layer: &ParallaxLayer,
) {
    let atlas = textures.get_or_fallback(&layer.texture);
    let (view_w, view_h) = display.native_size();
    let y = (view_h as i32 - atlas.height() as i32) / 2;
    let rect = SourceRect::full(atlas.width(), atlas.height());
    for x in layer.draw_positions(view_w) {
        display.draw_pixels(x, y, atlas.source(), rect);
    }
}

/// Solid rectangle.
pub fn fill_rect(display: &mut dyn Display, x: i32, y: i32, w: u32, h: u32, color: u16) {
    if w == 0 || h == 0 {
        return;
    }
    let row = vec![color; w as usize];
    let src = PixelSource {
        data: &row,
        width: w,
        height: 1,
    };
    for dy in 0..h as i32 {
        display.draw_pixels(x, y + dy, src, SourceRect::full(w, 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::headless::HeadlessDisplay;
    use crate::resources::texturestore::Atlas;

    fn make_display(w: u32, h: u32) -> HeadlessDisplay {
        let mut display = HeadlessDisplay::new(w, h);
        display.init("test", w, h).unwrap();
        display.clear(0);
        display
    }

    #[test]
    fn test_parallax_layer_covers_width() {
        let mut display = make_display(10, 4);
        let mut textures = TextureStore::new();
        textures.insert("strip", Atlas::filled(4, 2, 9));
        let mut layer = ParallaxLayer::new("strip", 4.0, 1.0);
        layer.advance(1.0);
        draw_parallax_layer(&mut display, &textures, &layer);

        let target = display.target().unwrap();
        for x in 0..10 {
            assert_eq!(target.pixel(x, 0), Some(0));
            assert_eq!(target.pixel(x, 1), Some(9), "x = {}", x);
            assert_eq!(target.pixel(x, 2), Some(9), "x = {}", x);
            assert_eq!(target.pixel(x, 3), Some(0));
        }
    }

    #[test]
    fn test_sprite_with_unknown_atlas_uses_fallback() {
        let mut display = make_display(40, 40);
        let mut reference = make_display(40, 40);
        let textures = TextureStore::new();
        let rect = SourceRect::new(0, 0, 32, 32);

        draw_sprite(&mut display, &textures, &SpriteFrame::new("missing", rect), 4, 4);
        draw_sprite(
            &mut reference,
            &textures,
            &SpriteFrame::new(crate::constants::FALLBACK_SPRITE_ID, rect),
            4,
            4,
        );
        assert_eq!(
            display.target().unwrap().pixels(),
            reference.target().unwrap().pixels()
        );
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut display = make_display(4, 4);
        fill_rect(&mut display, 2, -1, 5, 2, 3);
        let target = display.target().unwrap();
        assert_eq!(target.pixel(1, 0), Some(0));
        assert_eq!(target.pixel(2, 0), Some(3));
        assert_eq!(target.pixel(3, 0), Some(3));
        assert_eq!(target.pixel(2, 1), Some(0));
    }
}
