//! Partner digimon roster.

use serde::{Deserialize, Serialize};

/// The eight selectable partners, in cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Digimon {
    #[default]
    Agumon,
    Gabumon,
    Biyomon,
    Gatomon,
    Gomamon,
    Palmon,
    Tentomon,
    Patamon,
}

impl Digimon {
    pub const ALL: [Digimon; 8] = [
        Digimon::Agumon,
        Digimon::Gabumon,
        Digimon::Biyomon,
        Digimon::Gatomon,
        Digimon::Gomamon,
        Digimon::Palmon,
        Digimon::Tentomon,
        Digimon::Patamon,
    ];

    /// Texture id of the partner's sprite sheet.
    pub fn id(self) -> &'static str {
        match self {
            Digimon::Agumon => "agumon",
            Digimon::Gabumon => "gabumon",
            Digimon::Biyomon => "biyomon",
            Digimon::Gatomon => "gatomon",
            Digimon::Gomamon => "gomamon",
            Digimon::Palmon => "palmon",
            Digimon::Tentomon => "tentomon",
            Digimon::Patamon => "patamon",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|d| *d == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Digimon> {
        Self::ALL.get(index).copied()
    }

    /// Next partner, wrapping after the last one.
    pub fn next(self) -> Digimon {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Animation store key of the idle loop.
    pub fn idle_key(self) -> String {
        format!("{}_idle", self.id())
    }

    /// Animation store key of the walk cycle.
    pub fn walk_key(self) -> String {
        format!("{}_walk", self.id())
    }
}
