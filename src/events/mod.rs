//! Event types exchanged between the display driver and the game loop.
//!
//! Submodules:
//! - [`input`] – host window events (quit, key presses, resizes)
pub mod input;
