//! Host window events.
//!
//! Drivers translate whatever their windowing library reports into these and
//! hand them out from [`Display::poll_events`](crate::display::Display::poll_events).

use crate::resources::input::Scancode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The window was asked to close.
    Quit,
    /// A key went down.
    KeyDown(Scancode),
    /// The window was resized.
    Resized { width: u32, height: u32 },
}
