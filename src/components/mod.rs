//! Plain data owned by game states.
//!
//! Submodules overview:
//! - [`animation`] – playback cursor over a shared animation definition
//! - [`combatant`] – stats of an encounter enemy, with playable defaults
//! - [`digimon`] – the eight partner digimon and their asset keys
//! - [`parallax`] – horizontally repeating background strip with wrap-around offset
//! - [`sprite`] – atlas cell references and sprite-sheet addressing

pub mod animation;
pub mod combatant;
pub mod digimon;
pub mod parallax;
pub mod sprite;
