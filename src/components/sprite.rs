//! Sprite frame addressing.
//!
//! A [`SpriteFrame`] names an atlas in the
//! [`TextureStore`](crate::resources::texturestore::TextureStore) and the cell
//! inside it. Frames never carry pixels; they are resolved against the store
//! at draw time, so dropping the store invalidates every frame at once.

use std::sync::Arc;

use crate::constants::SPRITE_SHEET_COLUMNS;

/// Rectangle in source-pixel coordinates.
///
/// The origin may be negative; blits clip whatever falls outside the source
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl SourceRect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle covering a whole `w x h` buffer.
    pub fn full(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    /// Whether the rectangle lies fully inside a `width x height` buffer.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x as u64 + self.w as u64 <= width as u64
            && self.y as u64 + self.h as u64 <= height as u64
    }
}

/// One cell of a texture atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteFrame {
    /// Logical texture id.
    pub atlas: Arc<str>,
    /// Cell inside the atlas.
    pub rect: SourceRect,
}

impl SpriteFrame {
    pub fn new(atlas: impl Into<Arc<str>>, rect: SourceRect) -> Self {
        Self {
            atlas: atlas.into(),
            rect,
        }
    }
}

/// Cell `index` of a single-row sprite sheet of `atlas_w x atlas_h` pixels.
///
/// Returns `None` when the sheet is too narrow to hold the column layout or
/// the index is past the last column.
pub fn sheet_cell(atlas_w: u32, atlas_h: u32, index: usize) -> Option<SourceRect> {
    let cell_w = atlas_w / SPRITE_SHEET_COLUMNS;
    if cell_w == 0 || atlas_h == 0 || index >= SPRITE_SHEET_COLUMNS as usize {
        return None;
    }
    Some(SourceRect::new(
        (index as u32 * cell_w) as i32,
        0,
        cell_w,
        atlas_h,
    ))
}
