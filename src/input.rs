//! Input handling for the viewer.
//!
//! [`Input`] turns raw winit events into a per-frame snapshot: keys that
//! went down this frame, keys held, left-button drag movement and the
//! wheel delta. Call [`Input::begin_frame`] after each frame is consumed.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Pixels per wheel line, matching a browser's `deltaY` for one notch.
pub const LINE_HEIGHT_PX: f32 = 100.0;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Pause or resume rotation.
    Space,
    /// Toggle follow/free camera.
    C,
    /// Regenerate the field.
    R,
    Escape,
    Other,
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::KeyC => KeyCode::C,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other,
        }
    }
}

/// Input state tracking for keyboard and mouse.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    dragging: bool,
    last_cursor: Option<Vec2>,
    drag_delta: Vec2,

    // Browser convention: positive scrolls down (zooms out)
    wheel_delta: f32,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` went down this frame (repeats excluded).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Cursor movement while the left button was held, in pixels.
    pub fn drag_delta(&self) -> Vec2 {
        self.drag_delta
    }

    /// Accumulated wheel delta this frame, in pixels. Positive zooms out.
    pub fn wheel_delta(&self) -> f32 {
        self.wheel_delta
    }

    /// Clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.drag_delta = Vec2::ZERO;
        self.wheel_delta = 0.0;
    }

    /// Drop pointer state the UI took over, so a drag that started on the
    /// panel doesn't spin the camera.
    pub fn release_pointer(&mut self) {
        self.dragging = false;
        self.drag_delta = Vec2::ZERO;
        self.wheel_delta = 0.0;
    }

    /// Record one key transition.
    pub fn key_event(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_held.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Record a cursor position; accumulates drag while the button is down.
    pub fn cursor_moved(&mut self, position: Vec2) {
        if self.dragging {
            if let Some(last) = self.last_cursor {
                self.drag_delta += position - last;
            }
        }
        self.last_cursor = Some(position);
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Convert a winit wheel delta to browser pixels and accumulate it.
    pub fn scroll(&mut self, delta: MouseScrollDelta) {
        self.wheel_delta += match delta {
            MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT_PX,
            MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
        };
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.key_event(KeyCode::from(code), event.state);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.set_dragging(*state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => self.scroll(*delta),
            WindowEvent::Focused(false) => {
                self.keys_held.clear();
                self.dragging = false;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_key_pressed_once_per_hold() {
        let mut input = Input::new();
        input.key_event(KeyCode::Space, ElementState::Pressed);
        assert!(input.key_pressed(KeyCode::Space));

        input.begin_frame();
        // OS key repeat
        input.key_event(KeyCode::Space, ElementState::Pressed);
        assert!(!input.key_pressed(KeyCode::Space));
        assert!(input.keys_held.contains(&KeyCode::Space));

        input.key_event(KeyCode::Space, ElementState::Released);
        assert!(!input.keys_held.contains(&KeyCode::Space));
    }

    #[test]
    fn test_wheel_matches_browser_sign() {
        let mut input = Input::new();
        // One notch towards the user (scroll down) zooms out
        input.scroll(MouseScrollDelta::LineDelta(0.0, -1.0));
        assert_eq!(input.wheel_delta(), LINE_HEIGHT_PX);
        input.scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0)));
        assert_eq!(input.wheel_delta(), LINE_HEIGHT_PX - 40.0);

        input.begin_frame();
        assert_eq!(input.wheel_delta(), 0.0);
    }

    #[test]
    fn test_drag_only_while_button_held() {
        let mut input = Input::new();
        input.cursor_moved(Vec2::new(10.0, 10.0));
        input.cursor_moved(Vec2::new(20.0, 10.0));
        assert_eq!(input.drag_delta(), Vec2::ZERO);

        input.set_dragging(true);
        input.cursor_moved(Vec2::new(25.0, 13.0));
        input.cursor_moved(Vec2::new(30.0, 15.0));
        assert_eq!(input.drag_delta(), Vec2::new(10.0, 5.0));

        input.release_pointer();
        input.cursor_moved(Vec2::new(50.0, 50.0));
        assert_eq!(input.drag_delta(), Vec2::ZERO);
    }
}
