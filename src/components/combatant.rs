//! Combatant records used by encounters.
//!
//! Every field has a default so a partially specified row in
//! `combatants.json` still yields a playable placeholder.

use serde::{Deserialize, Serialize};

use crate::constants::{
    FALLBACK_SPRITE_ID, KUWAGAMON_ATTACK_DURATIONS_MS, KUWAGAMON_ATTACK_INDICES,
    KUWAGAMON_IDLE_DURATIONS_MS, KUWAGAMON_IDLE_INDICES,
};

const DEFAULT_NAME: &str = "Unknown";
const DEFAULT_HP: i32 = 100;
const DEFAULT_ATTACK: i32 = 10;
const DEFAULT_DEFENSE: i32 = 5;

/// Sheet cells and per-cell durations of one enemy animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTable {
    pub frames: Vec<usize>,
    pub durations_ms: Vec<u32>,
}

impl FrameTable {
    pub fn new(frames: &[usize], durations_ms: &[u32]) -> Self {
        Self {
            frames: frames.to_vec(),
            durations_ms: durations_ms.to_vec(),
        }
    }

    pub fn default_idle() -> Self {
        Self::new(&KUWAGAMON_IDLE_INDICES, &KUWAGAMON_IDLE_DURATIONS_MS)
    }

    pub fn default_attack() -> Self {
        Self::new(&KUWAGAMON_ATTACK_INDICES, &KUWAGAMON_ATTACK_DURATIONS_MS)
    }
}

/// Static stats of a combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Combatant {
    pub name: String,
    /// Texture id of the combatant's sprite sheet.
    pub sprite_id: String,
    pub current_hp: i32,
    pub max_hp: i32,
    pub attack_power: i32,
    pub defense_power: i32,
    /// Looping idle cycle on the `sprite_id` sheet.
    pub idle: FrameTable,
    /// Attack played once after the reveal.
    pub attack: FrameTable,
}

impl Default for Combatant {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            sprite_id: FALLBACK_SPRITE_ID.to_string(),
            current_hp: DEFAULT_HP,
            max_hp: DEFAULT_HP,
            attack_power: DEFAULT_ATTACK,
            defense_power: DEFAULT_DEFENSE,
            idle: FrameTable::default_idle(),
            attack: FrameTable::default_attack(),
        }
    }
}

impl Combatant {
    /// Build a combatant at full health.
    pub fn new(
        name: impl Into<String>,
        sprite_id: impl Into<String>,
        max_hp: i32,
        attack_power: i32,
        defense_power: i32,
    ) -> Self {
        Self {
            name: name.into(),
            sprite_id: sprite_id.into(),
            current_hp: max_hp.max(0),
            max_hp: max_hp.max(0),
            attack_power,
            defense_power,
            ..Self::default()
        }
        .normalized()
    }

    /// Clamp hit points into `0 ..= max_hp`.
    pub fn normalized(mut self) -> Self {
        self.max_hp = self.max_hp.max(0);
        self.current_hp = self.current_hp.clamp(0, self.max_hp);
        self
    }

    /// Remaining health in `0.0 ..= 1.0`.
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.current_hp as f32 / self.max_hp as f32
    }

    pub fn idle_key(&self) -> String {
        format!("{}_idle", self.sprite_id)
    }

    pub fn attack_key(&self) -> String {
        format!("{}_attack", self.sprite_id)
    }
}
