//! In-memory display driver.
//!
//! Behaves like a window driver without a window: `present` letterboxes the
//! off-screen target into a window-sized RGB565 buffer that tests can
//! inspect. Host events are scripted with [`HeadlessDisplay::push_event`].

use std::collections::VecDeque;

use log::{debug, info};

use crate::components::sprite::SourceRect;
use crate::display::{Display, PixelSource, RenderTarget};
use crate::events::input::HostEvent;
use crate::resources::windowsize::WindowSize;

pub struct HeadlessDisplay {
    native_width: u32,
    native_height: u32,
    target: Option<RenderTarget>,
    window_width: u32,
    window_height: u32,
    window: Vec<u16>,
    events: VecDeque<HostEvent>,
    frames_presented: u64,
    fail_init: bool,
    fail_present: bool,
    title: String,
}

impl HeadlessDisplay {
    pub fn new(native_width: u32, native_height: u32) -> Self {
        Self {
            native_width,
            native_height,
            target: None,
            window_width: 0,
            window_height: 0,
            window: Vec::new(),
            events: VecDeque::new(),
            frames_presented: 0,
            fail_init: false,
            fail_present: false,
            title: String::new(),
        }
    }

    /// Make the next [`Display::init`] fail.
    pub fn with_init_failure(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Make every following [`Display::present`] fail (or succeed again).
    pub fn set_present_failure(&mut self, fail: bool) {
        self.fail_present = fail;
    }

    pub fn push_event(&mut self, event: HostEvent) {
        self.events.push_back(event);
    }

    /// Resize the fake window and report it like a host would.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
        self.window = vec![0; width as usize * height as usize];
        self.events.push_back(HostEvent::Resized { width, height });
    }

    pub fn target(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    /// Pixels of the last presented window image.
    pub fn window_pixels(&self) -> &[u16] {
        &self.window
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Display for HeadlessDisplay {
    fn init(&mut self, title: &str, width: u32, height: u32) -> Result<(), String> {
        if self.fail_init {
            return Err("Headless display configured to fail".to_string());
        }
        if width == 0 || height == 0 {
            return Err(format!("Invalid window size {}x{}", width, height));
        }
        self.title = title.to_string();
        self.window_width = width;
        self.window_height = height;
        self.window = vec![0; width as usize * height as usize];
        self.target = Some(RenderTarget::new(self.native_width, self.native_height));
        info!(
            "Headless display '{}' {}x{} (native {}x{})",
            title, width, height, self.native_width, self.native_height
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.target.is_some()
    }

    fn native_size(&self) -> (u32, u32) {
        (self.native_width, self.native_height)
    }

    fn clear(&mut self, color: u16) {
        if let Some(target) = self.target.as_mut() {
            target.clear(color);
        }
    }

    fn draw_pixels(&mut self, dst_x: i32, dst_y: i32, src: PixelSource<'_>, rect: SourceRect) {
        if let Some(target) = self.target.as_mut() {
            target.blit(dst_x, dst_y, src, rect);
        }
    }

    fn present(&mut self) -> Result<(), String> {
        let Some(target) = self.target.as_ref() else {
            return Err("Display not initialized".to_string());
        };
        if self.fail_present {
            return Err("Present failed".to_string());
        }
        let letterbox = WindowSize {
            w: self.window_width,
            h: self.window_height,
        }
        .calculate_letterbox(self.native_width, self.native_height);
        target.present_into(
            &mut self.window,
            self.window_width,
            self.window_height,
            &letterbox,
        );
        self.frames_presented += 1;
        Ok(())
    }

    fn close(&mut self) {
        if self.target.take().is_some() {
            debug!("Headless display closed after {} frames", self.frames_presented);
        }
    }

    fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    fn poll_events(&mut self) -> Vec<HostEvent> {
        self.events.drain(..).collect()
    }
}
