//! Texture registry.
//!
//! Atlases are decoded once into RGB565 and shared through [`Arc`]. Anything
//! drawing a sprite looks the atlas up by id at draw time; a miss yields the
//! fallback checkerboard so a missing file never stops the game.

use std::path::Path;
use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::Resource;
use log::{info, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::components::digimon::Digimon;
use crate::constants::{
    BACKGROUND_HEIGHT, BACKGROUND_WIDTH, FALLBACK_SPRITE_ID, SPRITE_SHEET_COLUMNS,
    TRANSPARENT_KEY,
};
use crate::display::{PixelSource, rgb888_to_rgb565};

const FALLBACK_CELL: u32 = 32;
const FALLBACK_DARK: u16 = 0x0000;
const FALLBACK_STRIPE_A: u16 = 0x4A69;
const FALLBACK_STRIPE_B: u16 = 0x2945;

/// Decoded RGB565 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atlas {
    width: u32,
    height: u32,
    pixels: Vec<u16>,
}

impl Atlas {
    pub fn new(width: u32, height: u32, pixels: Vec<u16>) -> Result<Self, String> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(format!(
                "Atlas of {}x{} needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: u32, height: u32, color: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Convert tightly packed RGBA8 data. Pixels with alpha below 128 become
    /// the transparent key.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, String> {
        let pixels = rgba
            .chunks_exact(4)
            .map(|px| {
                if px[3] < 128 {
                    TRANSPARENT_KEY
                } else {
                    rgb888_to_rgb565(px[0], px[1], px[2])
                }
            })
            .collect();
        Self::new(width, height, pixels)
    }

    /// Magenta/black checkerboard laid out as a full sprite sheet.
    pub fn checkerboard_sheet() -> Self {
        let width = FALLBACK_CELL * SPRITE_SHEET_COLUMNS;
        let height = FALLBACK_CELL;
        let half = FALLBACK_CELL / 2;
        let pixels = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    if ((x / half) + (y / half)) % 2 == 0 {
                        TRANSPARENT_KEY
                    } else {
                        FALLBACK_DARK
                    }
                })
            })
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Opaque striped strip the size of a background layer.
    pub fn striped_background() -> Self {
        let pixels = (0..BACKGROUND_HEIGHT)
            .flat_map(|_| {
                (0..BACKGROUND_WIDTH).map(|x| {
                    if (x / FALLBACK_CELL) % 2 == 0 {
                        FALLBACK_STRIPE_A
                    } else {
                        FALLBACK_STRIPE_B
                    }
                })
            })
            .collect();
        Self {
            width: BACKGROUND_WIDTH,
            height: BACKGROUND_HEIGHT,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn source(&self) -> PixelSource<'_> {
        PixelSource {
            data: &self.pixels,
            width: self.width,
            height: self.height,
        }
    }
}

/// Registry of loaded atlases keyed by logical id.
#[derive(Resource)]
pub struct TextureStore {
    map: FxHashMap<String, Arc<Atlas>>,
    fallback: Arc<Atlas>,
    /// Missing ids already warned about.
    reported_missing: Mutex<FxHashSet<String>>,
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureStore {
    /// Empty store; only the placeholder sheet is registered, under
    /// [`FALLBACK_SPRITE_ID`].
    pub fn new() -> Self {
        let fallback = Arc::new(Atlas::checkerboard_sheet());
        let mut map = FxHashMap::default();
        map.insert(FALLBACK_SPRITE_ID.to_string(), fallback.clone());
        Self {
            map,
            fallback,
            reported_missing: Mutex::new(FxHashSet::default()),
        }
    }

    /// Store with placeholder sheets for every known sprite id.
    pub fn with_fallbacks() -> Self {
        let mut store = Self::new();
        for digimon in Digimon::ALL {
            store.insert(digimon.id(), Atlas::checkerboard_sheet());
        }
        store.insert("kuwagamon", Atlas::checkerboard_sheet());
        store
    }

    pub fn insert(&mut self, id: impl Into<String>, atlas: Atlas) {
        self.map.insert(id.into(), Arc::new(atlas));
    }

    /// Decode `path` and register it as `id`.
    ///
    /// On failure `placeholder` is registered instead and `false` is returned.
    pub fn load_or(&mut self, id: &str, path: &Path, placeholder: impl FnOnce() -> Atlas) -> bool {
        match decode_png(path) {
            Ok(atlas) => {
                info!(
                    "Loaded texture '{}' ({}x{}) from {}",
                    id,
                    atlas.width(),
                    atlas.height(),
                    path.display()
                );
                self.insert(id, atlas);
                true
            }
            Err(e) => {
                warn!("Using placeholder for texture '{}': {}", id, e);
                self.insert(id, placeholder());
                false
            }
        }
    }

    /// Load a sprite sheet, falling back to the checkerboard sheet.
    pub fn load(&mut self, id: &str, path: &Path) -> bool {
        self.load_or(id, path, Atlas::checkerboard_sheet)
    }

    pub fn get(&self, id: &str) -> Option<&Atlas> {
        self.map.get(id).map(|a| a.as_ref())
    }

    /// Atlas for `id`, or the fallback sheet. The first miss of each id is
    /// logged.
    pub fn get_or_fallback(&self, id: &str) -> &Atlas {
        match self.map.get(id) {
            Some(atlas) => atlas,
            None => {
                if self.note_missing(id) {
                    warn!("Texture '{}' not found, drawing fallback", id);
                }
                &self.fallback
            }
        }
    }

    /// Record a miss; `true` the first time `id` is seen.
    fn note_missing(&self, id: &str) -> bool {
        match self.reported_missing.lock() {
            Ok(mut reported) => reported.insert(id.to_string()),
            Err(_) => false,
        }
    }

    /// Ids that were looked up without being loaded.
    pub fn missing_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .reported_missing
            .lock()
            .map(|reported| reported.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    pub fn fallback(&self) -> &Atlas {
        &self.fallback
    }

    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drop every atlas at once.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(feature = "raylib")]
fn decode_png(path: &Path) -> Result<Atlas, String> {
    use raylib::prelude::Image;

    let path_str = path
        .to_str()
        .ok_or_else(|| format!("Non UTF-8 path {}", path.display()))?;
    if !path.is_file() {
        return Err(format!("{} does not exist", path.display()));
    }
    let image = Image::load_image(path_str)
        .map_err(|e| format!("Failed to load image {}: {}", path.display(), e))?;
    let width = image.width.max(0) as u32;
    let height = image.height.max(0) as u32;
    let pixels: Vec<u16> = image
        .get_image_data()
        .iter()
        .map(|c| {
            if c.a < 128 {
                TRANSPARENT_KEY
            } else {
                rgb888_to_rgb565(c.r, c.g, c.b)
            }
        })
        .collect();
    Atlas::new(width, height, pixels)
}

#[cfg(not(feature = "raylib"))]
fn decode_png(path: &Path) -> Result<Atlas, String> {
    Err(format!(
        "No image decoder in this build, cannot read {}",
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_keys_transparent_pixels() {
        let rgba = [255, 0, 0, 255, 0, 255, 0, 0];
        let atlas = Atlas::from_rgba(2, 1, &rgba).unwrap();
        assert_eq!(atlas.pixels(), &[0xF800, TRANSPARENT_KEY]);
    }

    #[test]
    fn test_new_checks_length() {
        assert!(Atlas::new(2, 2, vec![0; 3]).is_err());
    }

    #[test]
    fn test_get_or_fallback() {
        let mut store = TextureStore::new();
        store.insert("agumon", Atlas::filled(10, 1, 0xFFFF));
        assert_eq!(store.get_or_fallback("agumon").width(), 10);
        let fb = store.get_or_fallback("missing");
        assert_eq!(fb.width(), FALLBACK_CELL * SPRITE_SHEET_COLUMNS);
    }

    #[test]
    fn test_load_missing_file_uses_placeholder() {
        let mut store = TextureStore::new();
        let ok = store.load_or(
            "bg",
            Path::new("/definitely/not/here.png"),
            Atlas::striped_background,
        );
        assert!(!ok);
        let bg = store.get("bg").unwrap();
        assert_eq!((bg.width(), bg.height()), (BACKGROUND_WIDTH, BACKGROUND_HEIGHT));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut store = TextureStore::with_fallbacks();
        assert_eq!(store.len(), 10);
        store.clear();
        assert!(store.is_empty());
        // lookups still resolve after teardown
        assert_eq!(store.get_or_fallback("agumon").height(), FALLBACK_CELL);
    }

    #[test]
    fn test_missing_ids_recorded_once() {
        let store = TextureStore::new();
        for _ in 0..60 {
            store.get_or_fallback("ghost");
        }
        store.get_or_fallback("shade");
        assert!(!store.note_missing("ghost"));
        assert_eq!(store.missing_ids(), vec!["ghost".to_string(), "shade".to_string()]);
    }

    #[test]
    fn test_fallback_id_is_registered() {
        let store = TextureStore::new();
        assert!(store.contains(FALLBACK_SPRITE_ID));
    }
}
