//! Resources shared through the orchestrator's [`World`](bevy_ecs::world::World).
//!
//! This module groups the long-lived data states read and write while the
//! game runs: asset stores, input bindings, configuration, timing and the
//! pending state transition. Each submodule documents the semantics and
//! intended usage of its resource(s).
//!
//! Overview
//! - `animationstore` – animation definitions keyed by string IDs
//! - `backgrounds` – background variant discovery and selection
//! - `encounter` – seeded encounter RNG and the enemy roster
//! - `gameconfig` – INI-backed settings, including key bindings
//! - `gamestate` – pending high-level state transition
//! - `input` – scancode to action bindings
//! - `playerdata` – partner choice and step counters
//! - `texturestore` – decoded RGB565 atlases keyed by string IDs
//! - `windowsize` – host window size and letterbox math
//! - `worldtime` – scaled time and delta
pub mod animationstore;
pub mod backgrounds;
pub mod encounter;
pub mod gameconfig;
pub mod gamestate;
pub mod input;
pub mod playerdata;
pub mod texturestore;
pub mod windowsize;
pub mod worldtime;
