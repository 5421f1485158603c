//! Desktop window driver backed by raylib.
//!
//! The off-screen [`RenderTarget`] is expanded to RGBA every frame, uploaded
//! into a texture of the native size and drawn letterboxed with point
//! filtering. Frame pacing is left to the [`Game`](crate::game::Game) loop.

use log::{debug, info};
use raylib::prelude::*;

use crate::components::sprite::SourceRect;
use crate::display::{Display, PixelSource, RenderTarget};
use crate::events::input::HostEvent;
use crate::resources::input::Scancode;
use crate::resources::windowsize::WindowSize;

struct Window {
    rl: RaylibHandle,
    thread: RaylibThread,
    texture: Texture2D,
}

pub struct RaylibDisplay {
    native_width: u32,
    native_height: u32,
    target: Option<RenderTarget>,
    rgba: Vec<u8>,
    window: Option<Window>,
    last_size: (u32, u32),
}

impl RaylibDisplay {
    pub fn new(native_width: u32, native_height: u32) -> Self {
        Self {
            native_width,
            native_height,
            target: None,
            rgba: Vec::new(),
            window: None,
            last_size: (0, 0),
        }
    }
}

impl Display for RaylibDisplay {
    fn init(&mut self, title: &str, width: u32, height: u32) -> Result<(), String> {
        if self.window.is_some() {
            return Err("Display already initialized".to_string());
        }
        let (mut rl, thread) = raylib::init()
            .size(width as i32, height as i32)
            .resizable()
            .title(title)
            .build();
        // Escape is a bindable key, not a window close shortcut
        rl.set_exit_key(None);

        let image = Image::gen_image_color(
            self.native_width as i32,
            self.native_height as i32,
            Color::BLACK,
        );
        let mut texture = rl
            .load_texture_from_image(&thread, &image)
            .map_err(|e| format!("Failed to create render texture: {}", e))?;
        texture.set_texture_filter(&thread, TextureFilter::TEXTURE_FILTER_POINT);

        self.last_size = (rl.get_screen_width() as u32, rl.get_screen_height() as u32);
        self.window = Some(Window {
            rl,
            thread,
            texture,
        });
        self.target = Some(RenderTarget::new(self.native_width, self.native_height));
        info!(
            "Opened window '{}' {}x{} (native {}x{})",
            title, width, height, self.native_width, self.native_height
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.window.is_some() && self.target.is_some()
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
        let (Some(window), Some(target)) = (self.window.as_mut(), self.target.as_ref()) else {
            return Err("Display not initialized".to_string());
        };
        target.to_rgba(&mut self.rgba);
        window
            .texture
            .update_texture(&self.rgba)
            .map_err(|e| format!("Failed to upload frame: {}", e))?;

        let size = WindowSize {
            w: window.rl.get_screen_width().max(0) as u32,
            h: window.rl.get_screen_height().max(0) as u32,
        };
        let letterbox = size.calculate_letterbox(self.native_width, self.native_height);
        let src = Rectangle {
            x: 0.0,
            y: 0.0,
            width: self.native_width as f32,
            height: self.native_height as f32,
        };
        let dest = Rectangle {
            x: letterbox.x as f32,
            y: letterbox.y as f32,
            width: letterbox.width as f32,
            height: letterbox.height as f32,
        };

        let mut d = window.rl.begin_drawing(&window.thread);
        d.clear_background(Color::BLACK);
        d.draw_texture_pro(&window.texture, src, dest, Vector2::zero(), 0.0, Color::WHITE);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(window) = self.window.take() {
            // the texture must be released while the GL context still exists
            let Window {
                rl,
                thread,
                texture,
            } = window;
            drop(texture);
            drop(thread);
            drop(rl);
            debug!("Window closed");
        }
        self.target = None;
    }

    fn window_size(&self) -> (u32, u32) {
        match self.window.as_ref() {
            Some(window) => (
                window.rl.get_screen_width().max(0) as u32,
                window.rl.get_screen_height().max(0) as u32,
            ),
            None => (0, 0),
        }
    }

    fn poll_events(&mut self) -> Vec<HostEvent> {
        let Some(window) = self.window.as_mut() else {
            return Vec::new();
        };
        let mut events = Vec::new();
        if window.rl.window_should_close() {
            events.push(HostEvent::Quit);
        }
        let size = (
            window.rl.get_screen_width().max(0) as u32,
            window.rl.get_screen_height().max(0) as u32,
        );
        if size != self.last_size {
            self.last_size = size;
            events.push(HostEvent::Resized {
                width: size.0,
                height: size.1,
            });
        }
        while let Some(key) = window.rl.get_key_pressed() {
            if let Some(scancode) = map_key(key) {
                events.push(HostEvent::KeyDown(scancode));
            }
        }
        events
    }
}

impl Drop for RaylibDisplay {
    fn drop(&mut self) {
        self.close();
    }
}

fn map_key(key: KeyboardKey) -> Option<Scancode> {
    use KeyboardKey::*;
    let scancode = match key {
        KEY_A => Scancode::A,
        KEY_B => Scancode::B,
        KEY_C => Scancode::C,
        KEY_D => Scancode::D,
        KEY_E => Scancode::E,
        KEY_F => Scancode::F,
        KEY_G => Scancode::G,
        KEY_H => Scancode::H,
        KEY_I => Scancode::I,
        KEY_J => Scancode::J,
        KEY_K => Scancode::K,
        KEY_L => Scancode::L,
        KEY_M => Scancode::M,
        KEY_N => Scancode::N,
        KEY_O => Scancode::O,
        KEY_P => Scancode::P,
        KEY_Q => Scancode::Q,
        KEY_R => Scancode::R,
        KEY_S => Scancode::S,
        KEY_T => Scancode::T,
        KEY_U => Scancode::U,
        KEY_V => Scancode::V,
        KEY_W => Scancode::W,
        KEY_X => Scancode::X,
        KEY_Y => Scancode::Y,
        KEY_Z => Scancode::Z,
        KEY_ZERO | KEY_KP_0 => Scancode::Num0,
        KEY_ONE | KEY_KP_1 => Scancode::Num1,
        KEY_TWO | KEY_KP_2 => Scancode::Num2,
        KEY_THREE | KEY_KP_3 => Scancode::Num3,
        KEY_FOUR | KEY_KP_4 => Scancode::Num4,
        KEY_FIVE | KEY_KP_5 => Scancode::Num5,
        KEY_SIX | KEY_KP_6 => Scancode::Num6,
        KEY_SEVEN | KEY_KP_7 => Scancode::Num7,
        KEY_EIGHT | KEY_KP_8 => Scancode::Num8,
        KEY_NINE | KEY_KP_9 => Scancode::Num9,
        KEY_UP => Scancode::Up,
        KEY_DOWN => Scancode::Down,
        KEY_LEFT => Scancode::Left,
        KEY_RIGHT => Scancode::Right,
        KEY_ENTER => Scancode::Return,
        KEY_KP_ENTER => Scancode::KpEnter,
        KEY_ESCAPE => Scancode::Escape,
        KEY_BACKSPACE => Scancode::Backspace,
        KEY_TAB => Scancode::Tab,
        KEY_SPACE => Scancode::Space,
        KEY_F1 => Scancode::F1,
        KEY_F2 => Scancode::F2,
        KEY_F3 => Scancode::F3,
        KEY_F4 => Scancode::F4,
        KEY_F5 => Scancode::F5,
        KEY_F6 => Scancode::F6,
        KEY_F7 => Scancode::F7,
        KEY_F8 => Scancode::F8,
        KEY_F9 => Scancode::F9,
        KEY_F10 => Scancode::F10,
        KEY_F11 => Scancode::F11,
        KEY_F12 => Scancode::F12,
        _ => return None,
    };
    Some(scancode)
}
