//! Digivice adventure runtime library.
//!
//! This module exposes the display abstraction, resources, states and the
//! game orchestrator for use by the binary and by integration tests.

pub mod components;
pub mod constants;
pub mod display;
pub mod events;
pub mod game;
pub mod resources;
pub mod states;
pub mod systems;
