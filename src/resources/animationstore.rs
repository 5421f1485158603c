//! Animation definition registry.
//!
//! Animations are built once at load time from frame-index tables and are
//! read-only afterwards. Players hold an [`Arc`] to the definition and keep
//! their own [`AnimationCursor`](crate::components::animation::AnimationCursor).

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};

use crate::components::combatant::Combatant;
use crate::components::digimon::Digimon;
use crate::components::sprite::{SourceRect, SpriteFrame, sheet_cell};
use crate::constants::*;
use crate::resources::texturestore::TextureStore;

const FALLBACK_FRAME_SIZE: u32 = 32;

/// Frame sequence with per-frame durations.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    frames: SmallVec<[SpriteFrame; 4]>,
    durations_ms: SmallVec<[u32; 4]>,
    /// Whether playback wraps to the first frame after the last one.
    pub loops: bool,
}

impl Animation {
    /// Build an animation, rejecting empty sequences, mismatched lengths and
    /// zero durations.
    pub fn new(
        frames: impl IntoIterator<Item = SpriteFrame>,
        durations_ms: impl IntoIterator<Item = u32>,
        loops: bool,
    ) -> Result<Self, String> {
        let frames: SmallVec<[SpriteFrame; 4]> = frames.into_iter().collect();
        let durations_ms: SmallVec<[u32; 4]> = durations_ms.into_iter().collect();
        if frames.is_empty() {
            return Err("Animation needs at least one frame".to_string());
        }
        if frames.len() != durations_ms.len() {
            return Err(format!(
                "Animation has {} frames but {} durations",
                frames.len(),
                durations_ms.len()
            ));
        }
        if let Some(i) = durations_ms.iter().position(|d| *d == 0) {
            return Err(format!("Animation frame {} has a zero duration", i));
        }
        Ok(Self {
            frames,
            durations_ms,
            loops,
        })
    }

    /// Build an animation from cells of a single-row sprite sheet.
    ///
    /// The sheet must be present in `textures`; every index must address a
    /// cell inside it.
    pub fn from_sheet(
        textures: &TextureStore,
        atlas: &str,
        indices: &[usize],
        durations_ms: &[u32],
        loops: bool,
    ) -> Result<Self, String> {
        let sheet = textures
            .get(atlas)
            .ok_or_else(|| format!("Texture '{}' is not loaded", atlas))?;
        let key: Arc<str> = Arc::from(atlas);
        let frames = indices
            .iter()
            .map(|&i| {
                sheet_cell(sheet.width(), sheet.height(), i)
                    .map(|rect| SpriteFrame::new(key.clone(), rect))
                    .ok_or_else(|| {
                        format!(
                            "Frame {} is outside the {}x{} sheet '{}'",
                            i,
                            sheet.width(),
                            sheet.height(),
                            atlas
                        )
                    })
            })
            .collect::<Result<Vec<_>, String>>()?;
        Self::new(frames, durations_ms.iter().copied(), loops)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> &SpriteFrame {
        &self.frames[index.min(self.frames.len() - 1)]
    }

    pub fn duration_ms(&self, index: usize) -> u32 {
        self.durations_ms[index.min(self.durations_ms.len() - 1)]
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.durations_ms.iter().map(|d| *d as u64).sum()
    }
}

/// Central registry of animation definitions keyed by string ids.
#[derive(Resource)]
pub struct AnimationStore {
    pub animations: FxHashMap<String, Arc<Animation>>,
    fallback: Arc<Animation>,
}

impl Default for AnimationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationStore {
    pub fn new() -> Self {
        // first cell of the placeholder sheet, shown until replaced
        let fallback = Animation {
            frames: smallvec![SpriteFrame::new(
                FALLBACK_SPRITE_ID,
                SourceRect::new(0, 0, FALLBACK_FRAME_SIZE, FALLBACK_FRAME_SIZE),
            )],
            durations_ms: smallvec![1000],
            loops: true,
        };
        Self {
            animations: FxHashMap::default(),
            fallback: Arc::new(fallback),
        }
    }

    /// Build the partner tables: idle and walk for every partner.
    ///
    /// Sheets that fail validation are skipped with a warning.
    pub fn with_defaults(textures: &TextureStore) -> Self {
        let mut store = Self::new();
        for digimon in Digimon::ALL {
            store.build(
                textures,
                digimon.idle_key(),
                digimon.id(),
                &IDLE_INDICES,
                &IDLE_DURATIONS_MS,
                true,
            );
            store.build(
                textures,
                digimon.walk_key(),
                digimon.id(),
                &WALK_INDICES,
                &WALK_DURATIONS_MS,
                true,
            );
        }
        debug!("Built {} partner animations", store.animations.len());
        store
    }

    /// Add the idle and attack animations of every combatant whose sheet is
    /// loaded. Combatants drawn with the placeholder sheet are skipped.
    pub fn add_combatants<'a>(
        &mut self,
        textures: &TextureStore,
        combatants: impl IntoIterator<Item = &'a Combatant>,
    ) {
        for combatant in combatants {
            if combatant.sprite_id == FALLBACK_SPRITE_ID {
                continue;
            }
            self.build(
                textures,
                combatant.idle_key(),
                &combatant.sprite_id,
                &combatant.idle.frames,
                &combatant.idle.durations_ms,
                true,
            );
            self.build(
                textures,
                combatant.attack_key(),
                &combatant.sprite_id,
                &combatant.attack.frames,
                &combatant.attack.durations_ms,
                false,
            );
        }
    }

    fn build(
        &mut self,
        textures: &TextureStore,
        key: impl Into<String>,
        atlas: &str,
        indices: &[usize],
        durations_ms: &[u32],
        loops: bool,
    ) {
        let key = key.into();
        match Animation::from_sheet(textures, atlas, indices, durations_ms, loops) {
            Ok(anim) => self.insert(key, anim),
            Err(e) => warn!("Skipping animation '{}': {}", key, e),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, animation: Animation) {
        self.animations.insert(key.into(), Arc::new(animation));
    }

    pub fn get(&self, key: &str) -> Option<Arc<Animation>> {
        self.animations.get(key).cloned()
    }

    /// Animation for `key`, or a one-frame placeholder with a warning.
    pub fn get_or_fallback(&self, key: &str) -> Arc<Animation> {
        match self.animations.get(key) {
            Some(anim) => anim.clone(),
            None => {
                warn!("Animation '{}' not found, using placeholder", key);
                self.fallback.clone()
            }
        }
    }
}
